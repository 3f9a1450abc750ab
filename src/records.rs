//! Verse and word records and their addresses

use crate::error::{KuranError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest sura number in the corpus.
pub const MAX_SURA: u16 = 114;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseAddress {
    pub sura: u16,
    pub ayet: u16,
}

impl VerseAddress {
    pub fn new(sura: u16, ayet: u16) -> Self {
        Self { sura, ayet }
    }
}

impl fmt::Display for VerseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sura, self.ayet)
    }
}

/// Parses `sura/ayet`. Both halves must be positive integers; range against
/// the loaded corpus is not checked here.
impl FromStr for VerseAddress {
    type Err = KuranError;

    fn from_str(s: &str) -> Result<Self> {
        let (sura, ayet) = s.trim().split_once('/').ok_or_else(|| {
            KuranError::invalid_query(format!("'{}' is not a sura/ayet address", s))
        })?;

        let parse = |part: &str| -> Result<u16> {
            match part.parse::<u16>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(KuranError::invalid_query(format!(
                    "'{}' is not a positive verse number",
                    part
                ))),
            }
        };

        Ok(Self::new(parse(sura)?, parse(ayet)?))
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordAddress {
    pub sura: u16,
    pub ayet: u16,
    pub position: u16,
}

impl WordAddress {
    pub fn new(sura: u16, ayet: u16, position: u16) -> Self {
        Self { sura, ayet, position }
    }

    pub fn verse(&self) -> VerseAddress {
        VerseAddress::new(self.sura, self.ayet)
    }
}

impl fmt::Display for WordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.sura, self.ayet, self.position)
    }
}

/// A verse as delivered by the corpus loader. `arabic_text` may embed the
/// per-word `<span kok="...">` markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    #[serde(alias = "sure")]
    pub sura: u16,
    pub ayet: u16,
    #[serde(alias = "arabicText", alias = "arapca")]
    pub arabic_text: String,
    #[serde(alias = "meal", alias = "turkce")]
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
}

impl Verse {
    pub fn address(&self) -> VerseAddress {
        VerseAddress::new(self.sura, self.ayet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    #[serde(alias = "sureNo")]
    pub sura: u16,
    #[serde(alias = "ayetNo")]
    pub ayet: u16,
    #[serde(alias = "wordPosition", alias = "kelimeNo")]
    pub position: u16,
    #[serde(alias = "arapca")]
    pub arabic: String,
    #[serde(alias = "turkce")]
    pub turkish: String,
    #[serde(default, alias = "kok")]
    pub root: String,
}

impl Word {
    pub fn address(&self) -> WordAddress {
        WordAddress::new(self.sura, self.ayet, self.position)
    }

    pub fn verse_address(&self) -> VerseAddress {
        VerseAddress::new(self.sura, self.ayet)
    }

    /// Trimmed root, `None` when the record carries no root.
    pub fn trimmed_root(&self) -> Option<&str> {
        let root = self.root.trim();
        (!root.is_empty()).then_some(root)
    }
}
