//! Corpus record loading and translation sets
//!
//! Verse and word records come from JSON arrays. A record that does not
//! deserialize is skipped, logged and counted in [`LoadReport`]; a file that
//! cannot be read or is not a JSON array fails the whole load.

use crate::records::{Verse, VerseAddress, Word};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Verse records with their default translation.
pub const VERSES_FILE: &str = "kelime_manali_kuran_ve_turkce_meali.json";
/// Word-by-word records with glosses and roots.
pub const WORDS_FILE: &str = "kurani_kerimdeki_tum_kelimeler.json";
/// Parallel translations, one row per translator and verse.
pub const TRANSLATIONS_FILE: &str = "tum_kuran_mealler.csv";
/// Optional `form -> lemma` JSON used by the lexicon analyzer.
pub const LEXICON_FILE: &str = "kok_sozlugu.json";
/// Translator of the `meal` text carried by the verse records.
pub const DEFAULT_TRANSLATION: &str = "Diyanet İşleri Meali (Yeni)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Load counts for both record files of a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusLoadReport {
    pub verses: LoadReport,
    pub words: LoadReport,
}

fn load_records<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<(Vec<T>, LoadReport)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file at {:?}", kind, path))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} file at {:?} is not a JSON array", kind, path))?;

    let mut records = Vec::with_capacity(values.len());
    let mut report = LoadReport::default();
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => {
                records.push(record);
                report.loaded += 1;
            }
            Err(e) => {
                warn!("Skipping {} record #{}: {}", kind, i + 1, e);
                report.skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} {} records from {:?} ({} skipped)",
        report.loaded, kind, path, report.skipped
    );
    Ok((records, report))
}

pub fn load_verses(path: &Path) -> Result<(Vec<Verse>, LoadReport)> {
    load_records(path, "verse")
}

pub fn load_words(path: &Path) -> Result<(Vec<Word>, LoadReport)> {
    load_records(path, "word")
}

/// Anything that can hand out a full translation for a selector.
pub trait TranslationSource: Send + Sync {
    /// Selectors this source can serve, sorted.
    fn selectors(&self) -> Result<Vec<String>>;

    /// Verse texts for `selector`. Verses the source does not cover are
    /// simply absent from the map.
    fn translations(&self, selector: &str) -> Result<TranslationSet>;
}

/// One translator's verse texts and the count of their rows that did not
/// parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSet {
    pub texts: HashMap<VerseAddress, String>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct TranslationRow {
    #[serde(rename = "Hocalar")]
    translator: String,
    sure: u16,
    ayet: u16,
    meal: String,
}

/// CSV with a `Hocalar,sure,ayet,meal` header.
#[derive(Debug, Clone)]
pub struct CsvTranslationSource {
    path: PathBuf,
}

impl CsvTranslationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every data row keyed by its translator column. A row that does not
    /// parse keeps its translator and carries `None`; rows without a
    /// readable translator are logged and dropped.
    fn rows(&self) -> Result<Vec<(String, Option<TranslationRow>)>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open translations at {:?}", self.path))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {:?}", self.path))?
            .clone();
        let translator_column = headers
            .iter()
            .position(|h| h == "Hocalar")
            .with_context(|| format!("{:?} has no Hocalar column", self.path))?;

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable translation row #{}: {}", i + 1, e);
                    continue;
                }
            };
            let translator = record.get(translator_column).unwrap_or_default().to_string();
            if translator.is_empty() {
                warn!("Skipping translation row #{} without a translator", i + 1);
                continue;
            }
            match record.deserialize::<TranslationRow>(Some(&headers)) {
                Ok(row) => rows.push((translator, Some(row))),
                Err(e) => {
                    warn!("Skipping translation row #{} of '{}': {}", i + 1, translator, e);
                    rows.push((translator, None));
                }
            }
        }
        Ok(rows)
    }
}

impl TranslationSource for CsvTranslationSource {
    fn selectors(&self) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self.rows()?.into_iter().map(|(name, _)| name).collect();
        Ok(names.into_iter().collect())
    }

    fn translations(&self, selector: &str) -> Result<TranslationSet> {
        let selector = selector.trim();
        let mut set = TranslationSet::default();
        for (name, row) in self.rows()? {
            if name != selector {
                continue;
            }
            match row {
                Some(row) => {
                    set.texts.insert(VerseAddress::new(row.sure, row.ayet), row.meal);
                }
                None => set.skipped += 1,
            }
        }
        Ok(set)
    }
}

/// Copy of `verses` with every covered translation replaced.
pub fn apply_translation(
    verses: &[Verse],
    translations: &HashMap<VerseAddress, String>,
) -> Vec<Verse> {
    verses
        .iter()
        .map(|verse| match translations.get(&verse.address()) {
            Some(text) => Verse { translation: text.clone(), ..verse.clone() },
            None => verse.clone(),
        })
        .collect()
}
