//! Kuran - Quran corpus indexing and search
//!
//! Library providing verse and word indexing, multi-mode search, Arabic
//! and Turkish root analysis, frequency statistics and user data storage.

// Records and text helpers come first; everything else builds on them
pub mod records;
pub mod normalize;
pub mod markup;
pub mod suras;
pub mod error;
pub mod config;
pub mod index;
pub mod cache;
pub mod roots;
pub mod search;
pub mod stats;
pub mod loader;
pub mod store;
pub mod state;

pub use error::{KuranError, Result};
pub use config::{EngineConfig, OrphanPolicy, get_data_dir};
pub use records::{Verse, VerseAddress, Word, WordAddress};
pub use normalize::{normalize_arabic, normalize_turkish, turkish_lowercase};
pub use markup::{parse_words, plain_text, MarkupWord};
pub use suras::{revelation_place, sura_name, RevelationPlace};
pub use index::{build_index, BuildReport, CorpusIndex};
pub use cache::{RootCache, RootLanguage};
pub use roots::{
    extract_arabic_root, find_root, find_turkish_root, AnalyzerError, HeuristicOnly,
    LexiconAnalyzer, RootAnalyzer, RootEngine,
};
pub use search::{
    paginate, parse_query, search, Page, ParsedQuery, Query, SearchField, SearchFilters,
    SearchMode, SearchOptions, SearchResults, SearchScope, VerseMatch,
};
pub use stats::{
    corpus_stats, related_verses_by_root, root_frequency, root_report, top_n, verse_stats,
    word_frequency, CorpusStats, FrequencyTable, RootReport, VerseStats,
};
pub use loader::{
    load_verses, load_words, CorpusLoadReport, CsvTranslationSource, LoadReport, TranslationSet,
    TranslationSource,
};
pub use store::{DictionaryEntry, Favorite, UserStore};
pub use state::{Session, TranslationReport};
