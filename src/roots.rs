//! Root extraction: the Arabic affix-stripping heuristic, the Turkish stem
//! approximation and the pluggable analyzer seam they fall back from.
//!
//! Nothing here is a real morphological analysis. Roots produced by this
//! module group related words for discovery; they are never ground truth.

use crate::cache::{RootCache, RootLanguage};
use crate::normalize::{is_arabic_block, normalize_arabic, turkish_lowercase};
use anyhow::Context;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Curated overrides for high-frequency words the stripper gets wrong.
const SPECIAL_CASES: [(&str, &str); 24] = [
    ("باسمائهم", "اسم"),
    ("بسم", "اسم"),
    ("اسما", "اسم"),
    ("الرحمن", "رحم"),
    ("الرحيم", "رحم"),
    ("الله", "اله"),
    ("محمد", "حمد"),
    ("قرآن", "قرء"),
    ("كتاب", "كتب"),
    ("رسول", "رسل"),
    ("نبي", "نبا"),
    ("صلاة", "صلي"),
    ("زكاة", "زكي"),
    ("صيام", "صوم"),
    // only reached as a stripped stem (الحج), bare حج is below three letters
    ("حج", "حجج"),
    ("جهاد", "جهد"),
    ("ايمان", "امن"),
    ("اسلام", "سلم"),
    ("مؤمن", "امن"),
    ("كافر", "كفر"),
    ("مشرك", "شرك"),
    ("منافق", "نفق"),
    ("مؤمنون", "امن"),
    ("مؤمنات", "امن"),
];

/// Proclitics, longest first. Diacritic variants are gone after normalization.
const PREFIXES: [&str; 16] = [
    "وال", "بال", "فال", "كال", "ال", "لل", "ب", "ل", "س", "ك", "ف", "ت", "ي", "ن", "ه", "و",
];

/// Pronoun and plural suffixes, longest first.
const SUFFIXES: [&str; 26] = [
    "ون", "ين", "ان", "ات", "هم", "هن", "كم", "كن", "نا", "ها", "هو", "هي", "وا", "ین", "کم", "کن",
    "ي", "ى", "ة", "ا", "و", "ت", "ن", "ه", "ك", "م",
];

/// Above this many letters a stem is treated as still compound.
const COMPOUND_THRESHOLD: usize = 6;

fn special_case(word: &str) -> Option<&'static str> {
    SPECIAL_CASES
        .iter()
        .find(|(form, _)| *form == word)
        .map(|(_, root)| *root)
}

fn strip_prefix(word: &str) -> &str {
    PREFIXES
        .iter()
        .find_map(|prefix| word.strip_prefix(prefix).filter(|rest| !rest.is_empty()))
        .unwrap_or(word)
}

fn strip_suffix(word: &str) -> &str {
    SUFFIXES
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix).filter(|rest| !rest.is_empty()))
        .unwrap_or(word)
}

/// Middle 3-letter window made only of Arabic-block letters. For an even
/// number of windows the one just before the midpoint wins.
fn middle_window(chars: &[char]) -> Option<String> {
    let candidates: Vec<&[char]> = chars
        .windows(3)
        .filter(|w| w.iter().all(|&c| is_arabic_block(c)))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[(candidates.len() - 1) / 2].iter().collect())
}

/// Heuristic consonantal root of an Arabic word.
///
/// Steps: normalize, keep short words as they are, consult the
/// special-case table, strip one prefix and one suffix, then either pick the
/// middle 3-letter window of a long stem or take its first three letters.
/// Three-letter outputs are fixed points.
pub fn extract_arabic_root(word: &str) -> String {
    let normalized = normalize_arabic(word.trim());
    let len = normalized.chars().count();
    if len < 3 {
        return normalized;
    }
    if let Some(root) = special_case(&normalized) {
        return root.to_string();
    }
    if len == 3 {
        return normalized;
    }

    let stem: Vec<char> = strip_suffix(strip_prefix(&normalized)).chars().collect();
    let window = if stem.len() > COMPOUND_THRESHOLD { middle_window(&stem) } else { None };
    let root = window.unwrap_or_else(|| stem.iter().take(3).collect());

    match special_case(&root) {
        Some(mapped) => mapped.to_string(),
        None => root,
    }
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analyzer unavailable")]
    Unavailable,

    #[error("analysis failed: {0}")]
    Failed(String),
}

/// An external morphological analyzer. `Ok(None)` means the analyzer ran
/// but had no answer for the word.
pub trait RootAnalyzer: Send + Sync {
    fn analyze(&self, word: &str) -> Result<Option<String>, AnalyzerError>;
}

/// Always unavailable; every lookup takes the heuristic path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicOnly;

impl RootAnalyzer for HeuristicOnly {
    fn analyze(&self, _word: &str) -> Result<Option<String>, AnalyzerError> {
        Err(AnalyzerError::Unavailable)
    }
}

/// Dictionary-backed analyzer: surface form → lemma or stem.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    lemmas: HashMap<String, String>,
}

impl LexiconAnalyzer {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            lemmas: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Load a JSON object of `"form": "lemma"` pairs.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon at {:?}", path))?;
        let lemmas: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse lexicon at {:?}", path))?;
        Ok(Self { lemmas })
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

impl RootAnalyzer for LexiconAnalyzer {
    fn analyze(&self, word: &str) -> Result<Option<String>, AnalyzerError> {
        let word = word.trim();
        let found = self
            .lemmas
            .get(word)
            .or_else(|| self.lemmas.get(&normalize_arabic(word)))
            .or_else(|| self.lemmas.get(&turkish_lowercase(word)));
        Ok(found.cloned())
    }
}

/// Arabic root via the analyzer, falling back to [`extract_arabic_root`].
pub fn find_root(word: &str, analyzer: &dyn RootAnalyzer) -> String {
    match analyzer.analyze(word) {
        Ok(Some(lemma)) if !lemma.trim().is_empty() => {
            let normalized = normalize_arabic(lemma.trim());
            if normalized.chars().count() == 3 {
                normalized
            } else {
                extract_arabic_root(&lemma)
            }
        }
        Ok(_) => extract_arabic_root(word),
        Err(e) => {
            debug!("Arabic analyzer fallback for '{}': {}", word, e);
            extract_arabic_root(word)
        }
    }
}

/// Lower-cased stem via the analyzer; the word itself when there is none.
pub fn find_turkish_root(word: &str, analyzer: &dyn RootAnalyzer) -> String {
    match analyzer.analyze(word) {
        Ok(Some(stem)) if !stem.trim().is_empty() => turkish_lowercase(stem.trim()),
        Ok(_) => turkish_lowercase(word.trim()),
        Err(e) => {
            debug!("Turkish analyzer fallback for '{}': {}", word, e);
            turkish_lowercase(word.trim())
        }
    }
}

/// Analyzer plus a shared cache of already computed roots.
pub struct RootEngine {
    analyzer: Arc<dyn RootAnalyzer>,
    cache: RootCache,
}

impl RootEngine {
    pub fn new(analyzer: Arc<dyn RootAnalyzer>, cache_capacity: usize) -> Self {
        Self { analyzer, cache: RootCache::new(cache_capacity) }
    }

    pub fn heuristic(cache_capacity: usize) -> Self {
        Self::new(Arc::new(HeuristicOnly), cache_capacity)
    }

    pub fn analyzer(&self) -> &dyn RootAnalyzer {
        self.analyzer.as_ref()
    }

    pub fn cache(&self) -> &RootCache {
        &self.cache
    }

    pub fn root_of(&self, word: &str, language: RootLanguage) -> String {
        self.cache.get_or_insert_with(language, word, || match language {
            RootLanguage::Arabic => find_root(word, self.analyzer.as_ref()),
            RootLanguage::Turkish => find_turkish_root(word, self.analyzer.as_ref()),
        })
    }

    /// Candidates whose computed root equals `target`. Words with no usable
    /// root are skipped rather than failing the batch.
    pub fn match_by_root<'a, I>(
        &self,
        target: &str,
        candidates: I,
        language: RootLanguage,
    ) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let target = match language {
            RootLanguage::Arabic => normalize_arabic(target.trim()),
            RootLanguage::Turkish => turkish_lowercase(target.trim()),
        };
        candidates
            .into_iter()
            .filter(|word| !word.trim().is_empty())
            .filter(|word| {
                let root = self.root_of(word, language);
                !root.is_empty() && root == target
            })
            .map(str::to_string)
            .collect()
    }
}
