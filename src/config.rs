//! Engine configuration and data directory discovery

use crate::error::KuranError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the corpus data directory.
pub const DATA_DIR_ENV: &str = "KURAN_DATA_DIR";

/// Engine settings file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// What the index builder does with a word whose verse is not loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Log the word and index it anyway.
    #[default]
    Keep,
    /// Fail the build with a malformed-record error.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page_size: usize,
    pub related_verse_limit: usize,
    pub top_words: usize,
    pub top_letters: usize,
    /// Longest accepted regex pattern, in characters.
    pub max_pattern_len: usize,
    /// Ceiling on compiled regex size, in bytes.
    pub regex_size_limit: usize,
    pub root_cache_capacity: usize,
    pub orphan_policy: OrphanPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            related_verse_limit: 10,
            top_words: 10,
            top_letters: 5,
            max_pattern_len: 512,
            regex_size_limit: 1 << 20,
            root_cache_capacity: 4096,
            orphan_policy: OrphanPolicy::Keep,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {:?}", path))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        Ok(config)
    }

    /// Reject settings no engine could run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.page_size == 0 {
            return Err(KuranError::Config("page_size must be at least 1".to_string()));
        }
        if self.max_pattern_len == 0 || self.regex_size_limit == 0 {
            return Err(KuranError::Config("regex limits must be positive".to_string()));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config at {:?}", path))?;
        Ok(())
    }
}

/// Resolve the directory holding the corpus JSON files.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    // Dev mode: data next to the working directory
    #[cfg(debug_assertions)]
    {
        let dev_paths = [PathBuf::from("data"), PathBuf::from("veriler"), PathBuf::from("../data")];
        for path in &dev_paths {
            if path.join(crate::loader::VERSES_FILE).exists() {
                return path.canonicalize().unwrap_or_else(|_| path.clone());
            }
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("kuran");
    }

    PathBuf::from("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"page_size": 5, "orphan_policy": "reject"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.orphan_policy, OrphanPolicy::Reject);
        assert_eq!(config.related_verse_limit, 10);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = EngineConfig { top_words: 3, ..Default::default() };
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        let config = EngineConfig { page_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(KuranError::Config(_))));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }
}
