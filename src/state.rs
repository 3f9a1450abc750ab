//! Session state: the published corpus index and everything queries need

use crate::cache::RootLanguage;
use crate::config::{EngineConfig, CONFIG_FILE};
use crate::error::{KuranError, Result};
use crate::index::{build_index, BuildReport, CorpusIndex};
use crate::loader::{
    apply_translation, load_verses, load_words, CorpusLoadReport, CsvTranslationSource,
    TranslationSource, DEFAULT_TRANSLATION, LEXICON_FILE, TRANSLATIONS_FILE, VERSES_FILE,
    WORDS_FILE,
};
use crate::records::{Verse, VerseAddress, Word};
use crate::roots::{HeuristicOnly, LexiconAnalyzer, RootAnalyzer, RootEngine};
use crate::search::{paginate, search, Page, Query, SearchResults, VerseMatch};
use crate::stats::{
    corpus_stats, related_verses_by_root, root_report, search_vocabulary, CorpusStats,
    RootReport, VerseStats,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// One loaded corpus. Queries run against a snapshot of the current index;
/// a translation switch builds a new index and swaps it in whole.
pub struct Session {
    index: RwLock<Arc<CorpusIndex>>,
    /// Verses as loaded, before any translation switch.
    verses: Vec<Verse>,
    words: Vec<Word>,
    config: EngineConfig,
    roots: RootEngine,
    translation: RwLock<String>,
    translation_source: Option<Arc<dyn TranslationSource>>,
    load_report: CorpusLoadReport,
}

/// Outcome of a translation switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReport {
    pub build: BuildReport,
    /// Verses whose text came from the new translation.
    pub covered: usize,
    /// Rows of the selected translator that did not parse.
    pub skipped_rows: usize,
}

impl Session {
    pub fn new(
        verses: Vec<Verse>,
        words: Vec<Word>,
        config: EngineConfig,
        analyzer: Arc<dyn RootAnalyzer>,
    ) -> Result<Self> {
        config.validate()?;
        let index = build_index(&verses, &words, config.orphan_policy)?;
        let roots = RootEngine::new(analyzer, config.root_cache_capacity);
        Ok(Self {
            index: RwLock::new(Arc::new(index)),
            verses,
            words,
            config,
            roots,
            translation: RwLock::new(DEFAULT_TRANSLATION.to_string()),
            translation_source: None,
            load_report: CorpusLoadReport::default(),
        })
    }

    /// Source used by [`Session::use_translation`].
    pub fn with_translation_source(mut self, source: Arc<dyn TranslationSource>) -> Self {
        self.translation_source = Some(source);
        self
    }

    /// Load config, records, the optional lexicon and the optional
    /// translation table from `data_dir`.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let config = EngineConfig::load(&data_dir.join(CONFIG_FILE))?;
        let (verses, verse_report) = load_verses(&data_dir.join(VERSES_FILE))?;
        let (words, word_report) = load_words(&data_dir.join(WORDS_FILE))?;

        let lexicon_path = data_dir.join(LEXICON_FILE);
        let analyzer: Arc<dyn RootAnalyzer> = if lexicon_path.exists() {
            Arc::new(LexiconAnalyzer::load(&lexicon_path)?)
        } else {
            Arc::new(HeuristicOnly)
        };

        let mut session = Self::new(verses, words, config, analyzer)
            .with_context(|| format!("Failed to build corpus index from {:?}", data_dir))?;
        session.load_report = CorpusLoadReport { verses: verse_report, words: word_report };

        let translations_path = data_dir.join(TRANSLATIONS_FILE);
        if translations_path.exists() {
            session = session
                .with_translation_source(Arc::new(CsvTranslationSource::new(translations_path)));
        }
        info!("Opened corpus session at {:?}", data_dir);
        Ok(session)
    }

    /// [`Session::open`] on the blocking pool.
    pub async fn open_async(data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::task::spawn_blocking(move || Self::open(&data_dir))
            .await
            .context("Corpus loading task failed")?
    }

    /// Snapshot of the current index. Holders keep it alive across a swap.
    pub fn index(&self) -> Arc<CorpusIndex> {
        let guard = self.index.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn roots(&self) -> &RootEngine {
        &self.roots
    }

    /// Records loaded and skipped by [`Session::open`]; all zero for a
    /// session built from records in memory.
    pub fn load_report(&self) -> CorpusLoadReport {
        self.load_report
    }

    /// Selector of the active translation.
    pub fn translation(&self) -> String {
        self.translation
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Selectors offered by the session's translation source, empty without
    /// one.
    pub fn available_translations(&self) -> anyhow::Result<Vec<String>> {
        match &self.translation_source {
            Some(source) => source.selectors(),
            None => Ok(Vec::new()),
        }
    }

    /// [`Session::switch_translation`] against the session's own source.
    pub fn use_translation(&self, selector: &str) -> anyhow::Result<TranslationReport> {
        let source = self
            .translation_source
            .as_ref()
            .ok_or_else(|| KuranError::NotFound("translation source".to_string()))?;
        self.switch_translation(source.as_ref(), selector)
    }

    pub fn search(&self, query: &Query) -> Result<SearchResults> {
        search(query, &self.index(), &self.config)
    }

    /// Page of `results` using the configured page size.
    pub fn page<'a>(&self, results: &'a SearchResults, page_index: usize) -> Page<'a, VerseMatch> {
        paginate(&results.matches, page_index, self.config.page_size)
    }

    /// Rebuild the index with the translation `selector` from `source` and
    /// publish it. The previous index stays valid for readers holding it.
    pub fn switch_translation(
        &self,
        source: &dyn TranslationSource,
        selector: &str,
    ) -> anyhow::Result<TranslationReport> {
        let selector = selector.trim();
        let set = source.translations(selector)?;
        if set.texts.is_empty() {
            return Err(KuranError::NotFound(format!("translation '{}'", selector)).into());
        }

        let verses = apply_translation(&self.verses, &set.texts);
        let covered = self.verses.iter().filter(|v| set.texts.contains_key(&v.address())).count();
        let index = build_index(&verses, &self.words, self.config.orphan_policy)?;
        let report = TranslationReport {
            build: index.report().clone(),
            covered,
            skipped_rows: set.skipped,
        };

        *self.index.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(index);
        *self.translation.write().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            selector.to_string();

        if set.skipped > 0 {
            warn!("Translation '{}' has {} unreadable rows", selector, set.skipped);
        }
        info!(
            "Switched translation to '{}' ({} of {} verses covered)",
            selector,
            covered,
            self.verses.len()
        );
        Ok(report)
    }

    pub fn root_report(&self, word: &str) -> RootReport {
        root_report(word, &self.index(), self.roots.analyzer())
    }

    pub fn related_verses(&self, addr: VerseAddress) -> Vec<VerseAddress> {
        related_verses_by_root(addr, &self.index(), self.config.related_verse_limit)
    }

    pub fn verse_stats(&self, addr: VerseAddress) -> Result<VerseStats> {
        crate::stats::verse_stats(addr, &self.index(), self.config.related_verse_limit)
            .ok_or_else(|| KuranError::NotFound(format!("verse {}", addr)))
    }

    pub fn corpus_stats(&self) -> CorpusStats {
        corpus_stats(&self.index(), &self.config)
    }

    pub fn search_vocabulary(&self, text: &str, language: RootLanguage) -> Vec<String> {
        search_vocabulary(&self.index(), text, language, Some(&self.roots))
    }
}
