//! Corpus index: the lookup structures built once per corpus load
//!
//! Every map is a pure function of the verse and word lists. Word sets are
//! kept as `BTreeSet<WordAddress>` so consumers always see them in address
//! order, regardless of input order.

use crate::config::OrphanPolicy;
use crate::error::{KuranError, Result};
use crate::markup::compact_root;
use crate::normalize::{normalize_arabic, normalize_turkish, turkish_lowercase};
use crate::records::{Verse, VerseAddress, Word, WordAddress};
use crate::suras::is_valid_sura;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

/// Counts gathered while building; a skipped or orphaned record is always
/// reflected here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub verses: usize,
    pub words: usize,
    pub orphan_words: usize,
    pub rooted_words: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusIndex {
    verses: BTreeMap<VerseAddress, Verse>,
    words: BTreeMap<WordAddress, Word>,
    by_root: HashMap<String, BTreeSet<WordAddress>>,
    /// whitespace-free root -> root keys as they appear in the source
    root_aliases: HashMap<String, BTreeSet<String>>,
    by_turkish: HashMap<String, BTreeSet<WordAddress>>,
    by_arabic: HashMap<String, BTreeSet<WordAddress>>,
    sura_lengths: BTreeMap<u16, u16>,
    report: BuildReport,
}

/// Build all lookup structures from the raw records.
pub fn build_index(
    verses: &[Verse],
    words: &[Word],
    orphan_policy: OrphanPolicy,
) -> Result<CorpusIndex> {
    let mut index = CorpusIndex::default();

    for verse in verses {
        let addr = verse.address();
        if !is_valid_sura(verse.sura) || verse.ayet == 0 {
            return Err(KuranError::malformed(format!("verse address {} is out of range", addr)));
        }
        if index.verses.insert(addr, verse.clone()).is_some() {
            return Err(KuranError::malformed(format!("duplicate verse {}", addr)));
        }
        *index.sura_lengths.entry(verse.sura).or_insert(0) += 1;
    }

    for word in words {
        let addr = word.address();
        if word.sura == 0 || word.ayet == 0 || word.position == 0 {
            return Err(KuranError::malformed(format!("word address {} is out of range", addr)));
        }
        if index.words.contains_key(&addr) {
            return Err(KuranError::malformed(format!("duplicate word {}", addr)));
        }
        if !index.verses.contains_key(&word.verse_address()) {
            match orphan_policy {
                OrphanPolicy::Reject => {
                    return Err(KuranError::malformed(format!(
                        "word {} references missing verse {}",
                        addr,
                        word.verse_address()
                    )));
                }
                OrphanPolicy::Keep => {
                    warn!(
                        "Word {} references missing verse {}, indexing anyway",
                        addr,
                        word.verse_address()
                    );
                    index.report.orphan_words += 1;
                }
            }
        }

        if let Some(root) = word.trimmed_root() {
            index.by_root.entry(root.to_string()).or_default().insert(addr);
            index
                .root_aliases
                .entry(compact_root(root))
                .or_default()
                .insert(root.to_string());
            index.report.rooted_words += 1;
        }

        let turkish = normalize_turkish(&word.turkish);
        if !turkish.is_empty() {
            index.by_turkish.entry(turkish).or_default().insert(addr);
        }

        let arabic = word.arabic.trim();
        if !arabic.is_empty() {
            index.by_arabic.entry(arabic.to_string()).or_default().insert(addr);
        }

        index.words.insert(addr, word.clone());
    }

    index.report.verses = index.verses.len();
    index.report.words = index.words.len();

    info!(
        "Built corpus index: {} verses, {} words, {} roots, {} orphaned words",
        index.report.verses,
        index.report.words,
        index.by_root.len(),
        index.report.orphan_words
    );

    Ok(index)
}

impl CorpusIndex {
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn verse(&self, addr: VerseAddress) -> Option<&Verse> {
        self.verses.get(&addr)
    }

    pub fn word(&self, addr: WordAddress) -> Option<&Word> {
        self.words.get(&addr)
    }

    /// All verses in address order.
    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.verses.values()
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.words.values()
    }

    /// Words of one verse in position order.
    pub fn words_in_verse(&self, addr: VerseAddress) -> impl Iterator<Item = &Word> {
        let start = WordAddress::new(addr.sura, addr.ayet, 0);
        let end = WordAddress::new(addr.sura, addr.ayet, u16::MAX);
        self.words.range(start..=end).map(|(_, word)| word)
    }

    /// Exact lookup by trimmed root key.
    pub fn words_with_root(&self, root: &str) -> Option<&BTreeSet<WordAddress>> {
        self.by_root.get(root.trim())
    }

    /// Root lookup tolerant of spacing: the exact key, plus every key whose
    /// whitespace-free form equals the whitespace-free query.
    pub fn lookup_root(&self, root: &str) -> BTreeSet<WordAddress> {
        let mut found = self.words_with_root(root).cloned().unwrap_or_default();
        if let Some(keys) = self.root_aliases.get(&compact_root(root)) {
            for key in keys {
                if let Some(addrs) = self.by_root.get(key) {
                    found.extend(addrs.iter().copied());
                }
            }
        }
        found
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.by_root.keys().map(String::as_str)
    }

    pub fn words_with_turkish_form(&self, form: &str) -> Option<&BTreeSet<WordAddress>> {
        self.by_turkish.get(&normalize_turkish(form))
    }

    pub fn words_with_arabic_form(&self, form: &str) -> Option<&BTreeSet<WordAddress>> {
        self.by_arabic.get(form.trim())
    }

    pub fn turkish_forms(&self) -> impl Iterator<Item = (&str, &BTreeSet<WordAddress>)> {
        self.by_turkish.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn arabic_forms(&self) -> impl Iterator<Item = (&str, &BTreeSet<WordAddress>)> {
        self.by_arabic.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of loaded verses per sura.
    pub fn sura_lengths(&self) -> &BTreeMap<u16, u16> {
        &self.sura_lengths
    }

    /// Map a 1-based running verse number onto its address.
    pub fn address_of_ordinal(&self, ordinal: usize) -> Option<VerseAddress> {
        if ordinal == 0 {
            return None;
        }
        self.verses.keys().nth(ordinal - 1).copied()
    }

    /// Accepts either `sura/ayet` or a running verse number.
    pub fn verse_by_ordinal_or_address(&self, text: &str) -> Result<Option<VerseAddress>> {
        let text = text.trim();
        if text.contains('/') {
            let addr: VerseAddress = text.parse()?;
            return Ok(self.verses.contains_key(&addr).then_some(addr));
        }
        let ordinal: usize = text.parse().map_err(|_| {
            KuranError::invalid_query(format!("'{}' is not a verse reference", text))
        })?;
        Ok(self.address_of_ordinal(ordinal))
    }

    pub fn previous(&self, addr: VerseAddress) -> Option<VerseAddress> {
        self.verses.range(..addr).next_back().map(|(a, _)| *a)
    }

    pub fn next(&self, addr: VerseAddress) -> Option<VerseAddress> {
        use std::ops::Bound::{Excluded, Unbounded};
        self.verses
            .range((Excluded(addr), Unbounded))
            .next()
            .map(|(a, _)| *a)
    }

    /// Distinct Turkish glosses, sorted case-insensitively.
    pub fn turkish_vocabulary(&self) -> Vec<String> {
        let forms: BTreeSet<String> = self
            .words
            .values()
            .map(|w| w.turkish.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let mut forms: Vec<String> = forms.into_iter().collect();
        forms.sort_by_key(|f| turkish_lowercase(f));
        forms
    }

    /// Distinct diacritic-free Arabic forms, sorted.
    pub fn arabic_vocabulary(&self) -> Vec<String> {
        self.words
            .values()
            .map(|w| normalize_arabic(w.arabic.trim()))
            .filter(|a| !a.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn verse(sura: u16, ayet: u16, arabic: &str, translation: &str) -> Verse {
        Verse {
            sura,
            ayet,
            arabic_text: arabic.to_string(),
            translation: translation.to_string(),
            transliteration: None,
        }
    }

    pub(crate) fn word(
        sura: u16,
        ayet: u16,
        position: u16,
        arabic: &str,
        turkish: &str,
        root: &str,
    ) -> Word {
        Word {
            sura,
            ayet,
            position,
            arabic: arabic.to_string(),
            turkish: turkish.to_string(),
            root: root.to_string(),
        }
    }

    pub(crate) fn sample_corpus() -> (Vec<Verse>, Vec<Word>) {
        let verses = vec![
            verse(
                1,
                1,
                r#"<span kok="سمو">بِسْمِ</span> <span kok="اله">اللَّهِ</span> <span kok="رحم">الرَّحْمَٰنِ</span> <span kok="رحم">الرَّحِيمِ</span>"#,
                "Rahman ve Rahim olan Allah'ın adıyla",
            ),
            verse(
                1,
                2,
                r#"<span kok="حمد">الْحَمْدُ</span> <span kok="اله">لِلَّهِ</span> <span kok="ربب">رَبِّ</span> <span kok="علم">الْعَالَمِينَ</span>"#,
                "Hamd alemlerin Rabbi olan Allah'a mahsustur",
            ),
            verse(
                2,
                255,
                "اللَّهُ لَا إِلَٰهَ إِلَّا هُوَ",
                "Allah, kendisinden başka hiçbir ilah olmayandır",
            ),
            verse(96, 5, "عَلَّمَ الْإِنسَانَ مَا لَمْ يَعْلَمْ", "İnsana bilmediğini öğretti"),
        ];
        let words = vec![
            word(1, 1, 1, "بِسْمِ", "adıyla", "سمو"),
            word(1, 1, 2, "اللَّهِ", "Allah'ın", "اله"),
            word(1, 1, 3, "الرحمن", "Rahman", "رحم"),
            word(1, 1, 4, "الرَّحِيمِ", "Rahim", "رحم"),
            word(1, 2, 1, "الْحَمْدُ", "Hamd", "حمد"),
            word(1, 2, 2, "لِلَّهِ", "Allah'a", "اله"),
            word(1, 2, 3, "رَبِّ", "Rabbi", "ربب"),
            word(1, 2, 4, "رحيم", "Rahim", "رحم"),
            word(1, 2, 5, "الْعَالَمِينَ", "alemlerin", "علم"),
            word(2, 255, 1, "اللَّهُ", "Allah", "اله"),
            word(2, 255, 2, "لَا", "yoktur", ""),
            word(96, 5, 1, "عَلَّمَ", "öğretti", "علم"),
            word(96, 5, 5, "يَعْلَمْ", "bilmediğini", "ع ل م"),
        ];
        (verses, words)
    }

    pub(crate) fn sample_index() -> CorpusIndex {
        let (verses, words) = sample_corpus();
        build_index(&verses, &words, OrphanPolicy::Keep).unwrap()
    }

    #[test]
    fn test_address_key_consistency() {
        let index = sample_index();
        for w in index.words() {
            let found = index.word(w.address()).unwrap();
            assert_eq!(found.sura, w.sura);
            assert_eq!(found.ayet, w.ayet);
        }
        assert_eq!(index.report().words, 13);
        assert_eq!(index.report().verses, 4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let (verses, mut words) = sample_corpus();
        let first = build_index(&verses, &words, OrphanPolicy::Keep).unwrap();
        words.reverse();
        let second = build_index(&verses, &words, OrphanPolicy::Keep).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_root_index_skips_empty_roots() {
        let index = sample_index();
        assert_eq!(index.words_with_root("رحم").unwrap().len(), 3);
        assert_eq!(index.words_with_root(" رحم ").unwrap().len(), 3);
        assert!(index.words_with_root("").is_none());
        assert_eq!(index.report().rooted_words, 12);
    }

    #[test]
    fn test_lookup_root_accepts_spaced_roots() {
        let index = sample_index();
        let addrs: Vec<WordAddress> = index.lookup_root("علم").into_iter().collect();
        assert_eq!(
            addrs,
            vec![WordAddress::new(1, 2, 5), WordAddress::new(96, 5, 1), WordAddress::new(96, 5, 5)]
        );
        assert_eq!(index.lookup_root("ع ل م").len(), 3);
    }

    #[test]
    fn test_surface_form_keys() {
        let index = sample_index();
        // quotes drop out and I lowers to dotless ı
        assert_eq!(index.words_with_turkish_form("ALLAH'IN").unwrap().len(), 1);
        assert_eq!(index.words_with_turkish_form("Allah'ın").unwrap().len(), 1);
        assert!(index.words_with_turkish_form("Allahin").is_none());
        assert!(index.turkish_forms().any(|(k, _)| k == "allahın"));
        // arabic keys keep diacritics
        assert!(index.words_with_arabic_form("اللَّهُ").is_some());
        assert!(index.words_with_arabic_form("الله").is_none());
    }

    #[test]
    fn test_orphan_words_are_kept_and_counted() {
        let (verses, mut words) = sample_corpus();
        words.push(word(3, 1, 1, "الم", "Elif Lam Mim", ""));
        let index = build_index(&verses, &words, OrphanPolicy::Keep).unwrap();
        assert_eq!(index.report().orphan_words, 1);
        assert!(index.word(WordAddress::new(3, 1, 1)).is_some());

        let err = build_index(&verses, &words, OrphanPolicy::Reject).unwrap_err();
        assert!(matches!(err, KuranError::MalformedRecord(_)));
    }

    #[test]
    fn test_duplicates_are_malformed() {
        let (mut verses, words) = sample_corpus();
        verses.push(verse(1, 1, "", ""));
        assert!(matches!(
            build_index(&verses, &words, OrphanPolicy::Keep),
            Err(KuranError::MalformedRecord(_))
        ));

        let (verses, mut words) = sample_corpus();
        words.push(word(1, 1, 1, "x", "y", ""));
        assert!(build_index(&verses, &words, OrphanPolicy::Keep).is_err());
    }

    #[test]
    fn test_out_of_range_verse_is_malformed() {
        let verses = vec![verse(115, 1, "", "")];
        assert!(build_index(&verses, &[], OrphanPolicy::Keep).is_err());
        let verses = vec![verse(1, 0, "", "")];
        assert!(build_index(&verses, &[], OrphanPolicy::Keep).is_err());
    }

    #[test]
    fn test_ordinal_and_navigation() {
        let index = sample_index();
        assert_eq!(index.address_of_ordinal(3), Some(VerseAddress::new(2, 255)));
        assert_eq!(index.address_of_ordinal(0), None);
        assert_eq!(index.address_of_ordinal(99), None);
        assert_eq!(
            index.verse_by_ordinal_or_address("1/2").unwrap(),
            Some(VerseAddress::new(1, 2))
        );
        assert_eq!(index.verse_by_ordinal_or_address("4").unwrap(), Some(VerseAddress::new(96, 5)));
        assert_eq!(index.verse_by_ordinal_or_address("7/1").unwrap(), None);
        assert!(index.verse_by_ordinal_or_address("abc").is_err());

        assert_eq!(index.next(VerseAddress::new(1, 2)), Some(VerseAddress::new(2, 255)));
        assert_eq!(index.previous(VerseAddress::new(1, 1)), None);
        assert_eq!(index.previous(VerseAddress::new(2, 255)), Some(VerseAddress::new(1, 2)));
    }

    #[test]
    fn test_words_in_verse_and_sura_lengths() {
        let index = sample_index();
        let positions: Vec<u16> = index
            .words_in_verse(VerseAddress::new(1, 2))
            .map(|w| w.position)
            .collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
        assert_eq!(index.sura_lengths().get(&1), Some(&2));
    }

    #[test]
    fn test_vocabularies() {
        let index = sample_index();
        let turkish = index.turkish_vocabulary();
        assert_eq!(turkish.first().map(String::as_str), Some("adıyla"));
        assert!(turkish.contains(&"Rahim".to_string()));
        assert_eq!(turkish.iter().filter(|t| *t == "Rahim").count(), 1);

        let arabic = index.arabic_vocabulary();
        assert!(arabic.contains(&"الله".to_string()));
    }
}
