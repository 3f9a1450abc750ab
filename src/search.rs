//! Query evaluation over a built corpus index

use crate::config::EngineConfig;
use crate::error::{KuranError, Result};
use crate::index::CorpusIndex;
use crate::markup::{plain_text, verse_words};
use crate::normalize::{normalize_arabic, normalize_turkish, turkish_lowercase};
use crate::records::{VerseAddress, Word, WordAddress};
use crate::suras::{revelation_place, RevelationPlace};
use regex_lite::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Prefix selecting a root query.
pub const ROOT_PREFIX: &str = "kök:";
/// Prefix selecting an Arabic-only query.
pub const ARABIC_PREFIX: &str = "a:";
/// Prefix selecting a Turkish-only query.
pub const TURKISH_PREFIX: &str = "t:";

/// Upper bound on distinct highlight strings collected for regex results.
const MAX_REGEX_HIGHLIGHTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    VerseAddress,
    ByRoot,
    Arabic,
    Turkish,
    General,
    Regex,
    MultiWord,
}

/// Text fields consulted by regex and multi-word queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Turkish,
    Arabic,
    #[default]
    Both,
}

impl SearchField {
    fn turkish(self) -> bool {
        matches!(self, SearchField::Turkish | SearchField::Both)
    }

    fn arabic(self) -> bool {
        matches!(self, SearchField::Arabic | SearchField::Both)
    }
}

/// Granularity of substring queries: word surface forms, whole verse
/// texts, or the union of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Words,
    Verses,
    #[default]
    Both,
}

impl SearchScope {
    fn words(self) -> bool {
        matches!(self, SearchScope::Words | SearchScope::Both)
    }

    fn verses(self) -> bool {
        matches!(self, SearchScope::Verses | SearchScope::Both)
    }
}

/// Post-filters; every bound is inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub revelation: Option<RevelationPlace>,
    pub sura_range: Option<(u16, u16)>,
    pub ayet_range: Option<(u16, u16)>,
    pub word_length_range: Option<(usize, usize)>,
}

impl SearchFilters {
    fn accepts(&self, addr: VerseAddress, index: &CorpusIndex) -> bool {
        if let Some(place) = self.revelation {
            if revelation_place(addr.sura) != Some(place) {
                return false;
            }
        }
        if let Some((min, max)) = self.sura_range {
            if addr.sura < min || addr.sura > max {
                return false;
            }
        }
        if let Some((min, max)) = self.ayet_range {
            if addr.ayet < min || addr.ayet > max {
                return false;
            }
        }
        if let Some((min, max)) = self.word_length_range {
            let Some(verse) = index.verse(addr) else {
                return false;
            };
            let in_range = verse_words(&verse.arabic_text).iter().any(|word| {
                let len = normalize_arabic(word).chars().count();
                len >= min && len <= max
            });
            if !in_range {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub field: SearchField,
    pub scope: SearchScope,
}

/// A raw query with an optional explicit mode. Without one the mode is
/// inferred from the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub mode: Option<SearchMode>,
    #[serde(default)]
    pub options: SearchOptions,
    #[serde(default)]
    pub filters: SearchFilters,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Default::default() }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// A query after mode resolution, ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    /// `None` when the numbers are well formed but name no possible verse.
    VerseAddress(Option<VerseAddress>),
    ByRoot(String),
    Arabic(String),
    Turkish(String),
    General(String),
    Regex(String),
    MultiWord(Vec<String>),
}

impl ParsedQuery {
    pub fn mode(&self) -> SearchMode {
        match self {
            ParsedQuery::VerseAddress(_) => SearchMode::VerseAddress,
            ParsedQuery::ByRoot(_) => SearchMode::ByRoot,
            ParsedQuery::Arabic(_) => SearchMode::Arabic,
            ParsedQuery::Turkish(_) => SearchMode::Turkish,
            ParsedQuery::General(_) => SearchMode::General,
            ParsedQuery::Regex(_) => SearchMode::Regex,
            ParsedQuery::MultiWord(_) => SearchMode::MultiWord,
        }
    }
}

fn looks_like_address(text: &str) -> bool {
    match text.split_once('/') {
        Some((sura, ayet)) => {
            !sura.is_empty()
                && !ayet.is_empty()
                && sura.bytes().all(|b| b.is_ascii_digit())
                && ayet.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Parse `sura/ayet`. Zero or non-numeric parts are invalid; numbers too
/// large for any verse simply address nothing.
fn parse_address(text: &str) -> Result<Option<VerseAddress>> {
    if !looks_like_address(text) {
        return Err(KuranError::invalid_query(format!("'{}' is not a sura/ayet address", text)));
    }
    let (sura, ayet) = text.split_once('/').unwrap_or_default();
    let sura = sura.trim_start_matches('0');
    let ayet = ayet.trim_start_matches('0');
    if sura.is_empty() || ayet.is_empty() {
        return Err(KuranError::invalid_query(format!("'{}' contains a zero verse number", text)));
    }
    match (sura.parse::<u16>(), ayet.parse::<u16>()) {
        (Ok(sura), Ok(ayet)) => Ok(Some(VerseAddress::new(sura, ayet))),
        _ => Ok(None),
    }
}

fn non_empty(term: &str, what: &str) -> Result<String> {
    let term = term.trim();
    if term.is_empty() {
        return Err(KuranError::invalid_query(format!("empty {} query", what)));
    }
    Ok(term.to_string())
}

/// Resolve the query mode: an explicit mode wins, otherwise the first
/// matching rule of address, `kök:`, `a:`, `t:`, general.
pub fn parse_query(query: &Query) -> Result<ParsedQuery> {
    let text = query.text.trim();

    if let Some(mode) = query.mode {
        return match mode {
            SearchMode::VerseAddress => Ok(ParsedQuery::VerseAddress(parse_address(text)?)),
            SearchMode::ByRoot => Ok(ParsedQuery::ByRoot(non_empty(
                text.strip_prefix(ROOT_PREFIX).unwrap_or(text),
                "root",
            )?)),
            SearchMode::Arabic => Ok(ParsedQuery::Arabic(non_empty(
                text.strip_prefix(ARABIC_PREFIX).unwrap_or(text),
                "Arabic",
            )?)),
            SearchMode::Turkish => Ok(ParsedQuery::Turkish(non_empty(
                text.strip_prefix(TURKISH_PREFIX).unwrap_or(text),
                "Turkish",
            )?)),
            SearchMode::General => Ok(ParsedQuery::General(non_empty(text, "search")?)),
            SearchMode::Regex => Ok(ParsedQuery::Regex(non_empty(text, "regex")?)),
            SearchMode::MultiWord => {
                let terms: Vec<String> = text.split_whitespace().map(str::to_string).collect();
                if terms.is_empty() {
                    return Err(KuranError::invalid_query("empty multi-word query"));
                }
                Ok(ParsedQuery::MultiWord(terms))
            }
        };
    }

    if looks_like_address(text) {
        return Ok(ParsedQuery::VerseAddress(parse_address(text)?));
    }
    if let Some(root) = text.strip_prefix(ROOT_PREFIX) {
        return Ok(ParsedQuery::ByRoot(non_empty(root, "root")?));
    }
    if let Some(term) = text.strip_prefix(ARABIC_PREFIX) {
        return Ok(ParsedQuery::Arabic(non_empty(term, "Arabic")?));
    }
    if let Some(term) = text.strip_prefix(TURKISH_PREFIX) {
        return Ok(ParsedQuery::Turkish(non_empty(term, "Turkish")?));
    }
    Ok(ParsedQuery::General(non_empty(text, "search")?))
}

/// A matched verse with the positions of the words that caused the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMatch {
    pub address: VerseAddress,
    pub matched_words: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub mode: SearchMode,
    pub total_hits: usize,
    pub matches: Vec<VerseMatch>,
    pub highlight_terms: Vec<String>,
    pub elapsed_ms: u64,
}

impl SearchResults {
    pub fn addresses(&self) -> Vec<VerseAddress> {
        self.matches.iter().map(|m| m.address).collect()
    }
}

/// Verse address → matched word positions. Ordered by address.
type Hits = BTreeMap<VerseAddress, BTreeSet<u16>>;

fn add_word(hits: &mut Hits, addr: WordAddress) {
    hits.entry(addr.verse()).or_default().insert(addr.position);
}

fn turkish_in_text(text: &str, term: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        text.contains(term)
    } else {
        turkish_lowercase(text).contains(&turkish_lowercase(term))
    }
}

/// Raw match, or a match once both sides lose their diacritics.
fn arabic_in_text(text: &str, term: &str) -> bool {
    if text.contains(term) {
        return true;
    }
    let needle = normalize_arabic(term);
    !needle.is_empty() && normalize_arabic(text).contains(&needle)
}

fn word_matches(word: &Word, term: &str, field: SearchField, case_sensitive: bool) -> bool {
    (field.turkish() && turkish_in_text(&word.turkish, term, case_sensitive))
        || (field.arabic() && arabic_in_text(&word.arabic, term))
}

/// Substring hits for one term over the selected fields and scope.
fn term_hits(
    index: &CorpusIndex,
    term: &str,
    field: SearchField,
    scope: SearchScope,
    case_sensitive: bool,
) -> Hits {
    let mut hits = Hits::new();

    if scope.words() {
        if field.turkish() {
            if case_sensitive {
                for word in index.words().filter(|w| w.turkish.contains(term)) {
                    add_word(&mut hits, word.address());
                }
            } else {
                let needle = normalize_turkish(term);
                if !needle.is_empty() {
                    let forms = index.turkish_forms().filter(|(key, _)| key.contains(&needle));
                    for (_, addrs) in forms {
                        addrs.iter().for_each(|a| add_word(&mut hits, *a));
                    }
                }
            }
        }
        if field.arabic() {
            for (_, addrs) in index.arabic_forms().filter(|(key, _)| arabic_in_text(key, term)) {
                addrs.iter().for_each(|a| add_word(&mut hits, *a));
            }
        }
    }

    if scope.verses() {
        for verse in index.verses() {
            let matched = (field.turkish()
                && turkish_in_text(&verse.translation, term, case_sensitive))
                || (field.arabic() && arabic_in_text(&plain_text(&verse.arabic_text), term));
            if !matched {
                continue;
            }
            let positions = hits.entry(verse.address()).or_default();
            for word in index.words_in_verse(verse.address()) {
                if word_matches(word, term, field, case_sensitive) {
                    positions.insert(word.position);
                }
            }
        }
    }

    hits
}

fn root_hits(index: &CorpusIndex, root: &str) -> (Hits, Vec<String>) {
    let mut hits = Hits::new();
    let mut surfaces = BTreeSet::new();
    for addr in index.lookup_root(root) {
        add_word(&mut hits, addr);
        if let Some(word) = index.word(addr) {
            let surface = word.arabic.trim();
            if !surface.is_empty() {
                surfaces.insert(surface.to_string());
            }
        }
    }
    (hits, surfaces.into_iter().collect())
}

/// A compiled pattern plus its case rule. Case-insensitive patterns run over
/// Turkish-lowercased text, so `İ`/`i`, `I`/`ı` and the non-ASCII letters
/// fold the same way `t:` queries do.
struct TextRegex {
    re: Regex,
    fold: bool,
}

impl TextRegex {
    fn is_match(&self, text: &str) -> bool {
        if self.fold {
            self.re.is_match(&turkish_lowercase(text))
        } else {
            self.re.is_match(text)
        }
    }

    /// Matches as slices of the original `text`.
    fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        if !self.fold {
            return self.re.find_iter(text).map(|m| m.as_str()).collect();
        }
        let (folded, origin) = fold_with_offsets(text);
        self.re
            .find_iter(&folded)
            .map(|m| &text[origin[m.start()]..origin[m.end()]])
            .collect()
    }
}

fn fold_char(c: char) -> String {
    turkish_lowercase(c.encode_utf8(&mut [0; 4]))
}

/// Turkish-lowercased `text`, plus for every byte offset of the result the
/// offset of the source character it came from.
fn fold_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut folded = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len() + 1);
    for (start, c) in text.char_indices() {
        let lowered = fold_char(c);
        origin.extend(std::iter::repeat(start).take(lowered.len()));
        folded.push_str(&lowered);
    }
    origin.push(text.len());
    (folded, origin)
}

/// Lower-case the literal letters of a pattern. Escapes keep their case:
/// `\S`, `\W`, `\pL` and `\p{Lu}` mean the same thing afterwards.
fn fold_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push_str(&fold_char(c));
            continue;
        }
        out.push(c);
        let Some(escaped) = chars.next() else {
            break;
        };
        out.push(escaped);
        if !matches!(escaped, 'p' | 'P' | 'x' | 'u' | 'U') {
            continue;
        }
        let rest = chars.as_str();
        if rest.starts_with('{') {
            if let Some(end) = rest.find('}') {
                out.push_str(&rest[..=end]);
                chars = rest[end + 1..].chars();
            }
        } else if matches!(escaped, 'p' | 'P') {
            if let Some(class) = chars.next() {
                out.push(class);
            }
        }
    }
    out
}

fn compile_regex(pattern: &str, case_sensitive: bool, config: &EngineConfig) -> Result<TextRegex> {
    if pattern.chars().count() > config.max_pattern_len {
        debug!("Rejected regex of {} chars", pattern.chars().count());
        return Err(KuranError::invalid_query(format!(
            "regex longer than {} characters",
            config.max_pattern_len
        )));
    }
    let fold = !case_sensitive;
    let source = if fold { fold_pattern(pattern) } else { pattern.to_string() };
    let re = RegexBuilder::new(&source)
        .case_insensitive(fold)
        .size_limit(config.regex_size_limit)
        .build()
        .map_err(|e| {
            debug!("Rejected regex '{}': {}", pattern, e);
            KuranError::invalid_query(format!("invalid regex '{}': {}", pattern, e))
        })?;
    Ok(TextRegex { re, fold })
}

fn regex_hits(index: &CorpusIndex, re: &TextRegex, field: SearchField) -> (Hits, Vec<String>) {
    let mut hits = Hits::new();
    let mut found = BTreeSet::new();

    for verse in index.verses() {
        let arabic = plain_text(&verse.arabic_text);
        let mut texts: Vec<&str> = Vec::with_capacity(2);
        if field.turkish() {
            texts.push(&verse.translation);
        }
        if field.arabic() {
            texts.push(&arabic);
        }
        if !texts.iter().any(|text| re.is_match(text)) {
            continue;
        }

        for text in &texts {
            for m in re.find_all(text) {
                if found.len() >= MAX_REGEX_HIGHLIGHTS {
                    break;
                }
                if !m.trim().is_empty() {
                    found.insert(m.to_string());
                }
            }
        }

        let positions = hits.entry(verse.address()).or_default();
        for word in index.words_in_verse(verse.address()) {
            let matched = (field.turkish() && re.is_match(&word.turkish))
                || (field.arabic() && re.is_match(&word.arabic));
            if matched {
                positions.insert(word.position);
            }
        }
    }

    (hits, found.into_iter().collect())
}

/// Verses present in every term's hit set; positions are unioned.
fn intersect_hits(mut per_term: Vec<Hits>) -> Hits {
    let Some(mut acc) = per_term.pop() else {
        return Hits::new();
    };
    for hits in per_term {
        acc.retain(|addr, _| hits.contains_key(addr));
        for (addr, positions) in hits {
            if let Some(existing) = acc.get_mut(&addr) {
                existing.extend(positions);
            }
        }
    }
    acc
}

/// Evaluate an already parsed query. Results are deduplicated by verse and
/// ordered by `(sura, ayet)`.
pub fn evaluate(
    parsed: &ParsedQuery,
    options: &SearchOptions,
    filters: &SearchFilters,
    index: &CorpusIndex,
    config: &EngineConfig,
) -> Result<(Vec<VerseMatch>, Vec<String>)> {
    let (hits, highlight_terms) = match parsed {
        ParsedQuery::VerseAddress(addr) => {
            let mut hits = Hits::new();
            if let Some(addr) = (*addr).filter(|a| index.verse(*a).is_some()) {
                hits.insert(addr, BTreeSet::new());
            }
            (hits, Vec::new())
        }
        ParsedQuery::ByRoot(root) => root_hits(index, root),
        ParsedQuery::Arabic(term) => (
            term_hits(index, term, SearchField::Arabic, options.scope, options.case_sensitive),
            vec![term.clone()],
        ),
        ParsedQuery::Turkish(term) => (
            term_hits(index, term, SearchField::Turkish, options.scope, options.case_sensitive),
            vec![term.clone()],
        ),
        ParsedQuery::General(term) => (
            term_hits(index, term, SearchField::Both, options.scope, options.case_sensitive),
            vec![term.clone()],
        ),
        ParsedQuery::Regex(pattern) => {
            let re = compile_regex(pattern, options.case_sensitive, config)?;
            regex_hits(index, &re, options.field)
        }
        ParsedQuery::MultiWord(terms) => {
            let per_term = terms
                .iter()
                .map(|term| {
                    term_hits(index, term, options.field, options.scope, options.case_sensitive)
                })
                .collect();
            (intersect_hits(per_term), terms.clone())
        }
    };

    // orphaned words stay indexed but never produce a match without a verse
    let matches = hits
        .into_iter()
        .filter(|(addr, _)| index.verse(*addr).is_some())
        .filter(|(addr, _)| filters.accepts(*addr, index))
        .map(|(address, positions)| VerseMatch {
            address,
            matched_words: positions.into_iter().collect(),
        })
        .collect();

    Ok((matches, highlight_terms))
}

/// Parse and evaluate a query against the index.
pub fn search(query: &Query, index: &CorpusIndex, config: &EngineConfig) -> Result<SearchResults> {
    let start = std::time::Instant::now();

    let parsed = parse_query(query)?;
    let (matches, highlight_terms) =
        evaluate(&parsed, &query.options, &query.filters, index, config)?;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!("Query '{}' ({:?}) matched {} verses", query.text, parsed.mode(), matches.len());

    Ok(SearchResults {
        query: query.text.clone(),
        mode: parsed.mode(),
        total_hits: matches.len(),
        matches,
        highlight_terms,
        elapsed_ms,
    })
}

/// One page of an ordered result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based, after clamping.
    pub page_index: usize,
    /// Never zero, even for an empty result list.
    pub page_count: usize,
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Slice out page `page_index`, clamped into the valid page range.
pub fn paginate<T>(results: &[T], page_index: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let page_count = page_count(results.len(), page_size);
    let page_index = page_index.min(page_count - 1);
    let start = (page_index * page_size).min(results.len());
    let end = (start + page_size).min(results.len());
    Page { items: &results[start..end], page_index, page_count }
}
