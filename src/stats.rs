//! Frequency tables and corpus statistics

use crate::cache::RootLanguage;
use crate::config::EngineConfig;
use crate::index::CorpusIndex;
use crate::markup::{parse_words, verse_words};
use crate::normalize::{normalize_arabic, normalize_turkish, tokenize, turkish_lowercase};
use crate::records::{Verse, VerseAddress};
use crate::roots::{find_root, RootAnalyzer, RootEngine};
use crate::suras::{revelation_place, RevelationPlace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Term counts that remember the order terms were first seen in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: &str) {
        self.add_many(term, 1);
    }

    pub fn add_many(&mut self, term: &str, count: usize) {
        match self.positions.get(term) {
            Some(&i) => self.counts[i].1 += count,
            None => {
                self.positions.insert(term.to_string(), self.counts.len());
                self.counts.push((term.to_string(), count));
            }
        }
    }

    pub fn get(&self, term: &str) -> usize {
        self.positions.get(term).map_or(0, |&i| self.counts[i].1)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(term, count)| (term.as_str(), *count))
    }
}

impl FromIterator<String> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut table = Self::new();
        for term in iter {
            table.add(&term);
        }
        table
    }
}

/// The `n` most frequent entries, count descending. Equal counts keep
/// first-seen order.
pub fn top_n(table: &FrequencyTable, n: usize) -> Vec<(String, usize)> {
    let mut entries = table.counts.clone();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Count translation tokens over `verses` after `normalize`. Tokens that
/// normalize to nothing are dropped.
pub fn word_frequency<'a, I, F>(verses: I, normalize: F) -> FrequencyTable
where
    I: IntoIterator<Item = &'a Verse>,
    F: Fn(&str) -> String,
{
    let mut table = FrequencyTable::new();
    for verse in verses {
        for token in tokenize(&verse.translation) {
            let term = normalize(token);
            if !term.is_empty() {
                table.add(&term);
            }
        }
    }
    table
}

pub fn root_frequency(index: &CorpusIndex, root: &str) -> usize {
    index.words_with_root(root).map_or(0, |words| words.len())
}

/// Roots of a verse in word order, duplicates kept. Markup roots are used
/// when the verse has no word records.
fn verse_roots(addr: VerseAddress, index: &CorpusIndex) -> Vec<String> {
    let roots: Vec<String> = index
        .words_in_verse(addr)
        .filter_map(|w| w.trimmed_root())
        .map(str::to_string)
        .collect();
    if !roots.is_empty() {
        return roots;
    }
    index
        .verse(addr)
        .map(|verse| parse_words(&verse.arabic_text).into_iter().filter_map(|w| w.root).collect())
        .unwrap_or_default()
}

/// Verses sharing at least one root with `addr`, excluding `addr` itself,
/// ascending, at most `max`.
pub fn related_verses_by_root(
    addr: VerseAddress,
    index: &CorpusIndex,
    max: usize,
) -> Vec<VerseAddress> {
    let roots: BTreeSet<String> = verse_roots(addr, index).into_iter().collect();
    let related: BTreeSet<VerseAddress> = roots
        .iter()
        .flat_map(|root| index.lookup_root(root))
        .map(|word| word.verse())
        .filter(|verse| *verse != addr)
        .collect();
    related.into_iter().take(max).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootReport {
    pub root: String,
    pub frequency: usize,
    /// Distinct diacritic-free surface forms, sorted.
    pub derived_forms: Vec<String>,
    /// Corpus-wide count of each derived form, most frequent first.
    pub form_frequencies: Vec<(String, usize)>,
    pub sample_verse: Option<VerseAddress>,
}

/// Root recorded in the corpus for a word with the same normalized form.
fn corpus_root(word: &str, index: &CorpusIndex) -> Option<String> {
    let wanted = normalize_arabic(word.trim());
    if wanted.is_empty() {
        return None;
    }
    index
        .words()
        .find(|w| w.trimmed_root().is_some() && normalize_arabic(w.arabic.trim()) == wanted)
        .and_then(|w| w.trimmed_root())
        .map(str::to_string)
}

/// Look a word up by root: corpus annotation first, analyzer or heuristic
/// otherwise.
pub fn root_report(word: &str, index: &CorpusIndex, analyzer: &dyn RootAnalyzer) -> RootReport {
    let root = corpus_root(word, index).unwrap_or_else(|| find_root(word, analyzer));
    let matches = index.lookup_root(&root);

    let forms: BTreeSet<String> = matches
        .iter()
        .filter_map(|addr| index.word(*addr))
        .map(|w| normalize_arabic(w.arabic.trim()))
        .filter(|form| !form.is_empty())
        .collect();

    let mut corpus_counts: HashMap<String, usize> = HashMap::new();
    for w in index.words() {
        let form = normalize_arabic(w.arabic.trim());
        if forms.contains(&form) {
            *corpus_counts.entry(form).or_insert(0) += 1;
        }
    }
    let table: FrequencyTable = forms
        .iter()
        .fold(FrequencyTable::new(), |mut table, form| {
            table.add_many(form, corpus_counts.get(form).copied().unwrap_or(0));
            table
        });

    RootReport {
        frequency: matches.len(),
        sample_verse: matches.iter().next().map(|w| w.verse()),
        form_frequencies: top_n(&table, table.len()),
        derived_forms: forms.into_iter().collect(),
        root,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub verse_count: usize,
    pub sura_count: usize,
    pub average_verses_per_sura: f64,
    /// `(sura, verse count)`; the lowest sura number wins ties.
    pub longest_sura: Option<(u16, usize)>,
    pub shortest_sura: Option<(u16, usize)>,
    pub turkish_word_count: usize,
    pub arabic_word_count: usize,
    pub average_turkish_words_per_verse: f64,
    pub average_arabic_words_per_verse: f64,
    pub unique_turkish_words: usize,
    pub unique_arabic_words: usize,
    pub meccan_suras: usize,
    pub medinan_suras: usize,
    pub top_words: Vec<(String, usize)>,
    pub top_letters: Vec<(String, usize)>,
    pub average_arabic_word_length: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn corpus_stats(index: &CorpusIndex, config: &EngineConfig) -> CorpusStats {
    let sura_lengths: BTreeMap<u16, usize> = index
        .sura_lengths()
        .iter()
        .map(|(sura, count)| (*sura, *count as usize))
        .collect();

    let mut longest: Option<(u16, usize)> = None;
    let mut shortest: Option<(u16, usize)> = None;
    for (&sura, &count) in &sura_lengths {
        if longest.map_or(true, |(_, best)| count > best) {
            longest = Some((sura, count));
        }
        if shortest.map_or(true, |(_, best)| count < best) {
            shortest = Some((sura, count));
        }
    }

    let mut turkish_words = FrequencyTable::new();
    let mut turkish_word_count = 0;
    let mut arabic_forms: BTreeSet<String> = BTreeSet::new();
    let mut arabic_word_count = 0;
    let mut letters = FrequencyTable::new();
    let mut letter_total = 0;

    for verse in index.verses() {
        let tokens = tokenize(&verse.translation);
        turkish_word_count += tokens.len();
        for token in tokens {
            turkish_words.add(&turkish_lowercase(token));
        }

        let words = verse_words(&verse.arabic_text);
        arabic_word_count += words.len();
        for word in words {
            let normalized = normalize_arabic(&word);
            if normalized.is_empty() {
                continue;
            }
            for c in normalized.chars().filter(|c| c.is_alphabetic()) {
                letters.add(c.encode_utf8(&mut [0; 4]));
                letter_total += 1;
            }
            arabic_forms.insert(normalized);
        }
    }

    let meccan_suras = sura_lengths
        .keys()
        .filter(|s| revelation_place(**s) == Some(RevelationPlace::Meccan))
        .count();
    let medinan_suras = sura_lengths
        .keys()
        .filter(|s| revelation_place(**s) == Some(RevelationPlace::Medinan))
        .count();

    let verse_count = index.verse_count();
    CorpusStats {
        verse_count,
        sura_count: sura_lengths.len(),
        average_verses_per_sura: ratio(verse_count, sura_lengths.len()),
        longest_sura: longest,
        shortest_sura: shortest,
        turkish_word_count,
        arabic_word_count,
        average_turkish_words_per_verse: ratio(turkish_word_count, verse_count),
        average_arabic_words_per_verse: ratio(arabic_word_count, verse_count),
        unique_turkish_words: turkish_words.len(),
        unique_arabic_words: arabic_forms.len(),
        meccan_suras,
        medinan_suras,
        top_words: top_n(&turkish_words, config.top_words),
        top_letters: top_n(&letters, config.top_letters),
        average_arabic_word_length: ratio(letter_total, arabic_word_count),
    }
}

/// Undirected edge between two roots of one verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootPair {
    pub first: String,
    pub second: String,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseStats {
    pub address: VerseAddress,
    pub word_count: usize,
    pub root_distribution: Vec<(String, usize)>,
    pub related_verses: Vec<VerseAddress>,
    pub co_occurrences: Vec<RootPair>,
}

/// Each ordered pair of differing roots adds one to the edge weight.
fn root_co_occurrences(roots: &[String]) -> Vec<RootPair> {
    let mut edges: BTreeMap<(String, String), usize> = BTreeMap::new();
    for (i, a) in roots.iter().enumerate() {
        for b in &roots[i + 1..] {
            if a == b {
                continue;
            }
            let key = if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
            *edges.entry(key).or_insert(0) += 1;
        }
    }
    let mut pairs: Vec<RootPair> = edges
        .into_iter()
        .map(|((first, second), weight)| RootPair { first, second, weight })
        .collect();
    pairs.sort_by(|a, b| b.weight.cmp(&a.weight));
    pairs
}

/// `None` when the verse is not in the index.
pub fn verse_stats(
    addr: VerseAddress,
    index: &CorpusIndex,
    related_limit: usize,
) -> Option<VerseStats> {
    let verse = index.verse(addr)?;
    let word_records = index.words_in_verse(addr).count();
    let word_count = if word_records > 0 {
        word_records
    } else {
        verse_words(&verse.arabic_text).len()
    };

    let roots = verse_roots(addr, index);
    let distribution: FrequencyTable = roots.iter().cloned().collect();

    Some(VerseStats {
        address: addr,
        word_count,
        root_distribution: top_n(&distribution, distribution.len()),
        related_verses: related_verses_by_root(addr, index, related_limit),
        co_occurrences: root_co_occurrences(&roots),
    })
}

/// Vocabulary entries containing `text` after normalization. With an
/// engine, entries sharing the query's root are added too.
pub fn search_vocabulary(
    index: &CorpusIndex,
    text: &str,
    language: RootLanguage,
    engine: Option<&RootEngine>,
) -> Vec<String> {
    let (vocabulary, needle) = match language {
        RootLanguage::Turkish => (index.turkish_vocabulary(), normalize_turkish(text)),
        RootLanguage::Arabic => (index.arabic_vocabulary(), normalize_arabic(text.trim())),
    };
    if needle.is_empty() {
        return Vec::new();
    }

    let mut found: BTreeSet<String> = vocabulary
        .iter()
        .filter(|entry| match language {
            RootLanguage::Turkish => normalize_turkish(entry).contains(&needle),
            RootLanguage::Arabic => entry.contains(&needle),
        })
        .cloned()
        .collect();

    if let Some(engine) = engine {
        let target = engine.root_of(text.trim(), language);
        let candidates = vocabulary.iter().map(String::as_str);
        found.extend(engine.match_by_root(&target, candidates, language));
    }

    let mut found: Vec<String> = found.into_iter().collect();
    if language == RootLanguage::Turkish {
        found.sort_by_key(|f| turkish_lowercase(f));
    }
    found
}
