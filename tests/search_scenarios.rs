//! End-to-end query scenarios over a small hand-built corpus

use kuran_lib::search::page_count;
use kuran_lib::{
    build_index, extract_arabic_root, paginate, search, CorpusIndex, EngineConfig, HeuristicOnly,
    KuranError, OrphanPolicy, Query, SearchMode, Session, Verse, VerseAddress, Word,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn verse(sura: u16, ayet: u16, arabic: &str, translation: &str) -> Verse {
    Verse {
        sura,
        ayet,
        arabic_text: arabic.to_string(),
        translation: translation.to_string(),
        transliteration: None,
    }
}

fn word(sura: u16, ayet: u16, position: u16, arabic: &str, turkish: &str, root: &str) -> Word {
    Word {
        sura,
        ayet,
        position,
        arabic: arabic.to_string(),
        turkish: turkish.to_string(),
        root: root.to_string(),
    }
}

fn fatiha() -> (Vec<Verse>, Vec<Word>) {
    let verses = vec![
        verse(
            1,
            1,
            r#"<span kok="سمو">بِسْمِ</span> <span kok="اله">اللَّهِ</span> <span kok="رحم">الرَّحْمَٰنِ</span> <span kok="رحم">الرَّحِيمِ</span>"#,
            "Rahmân ve Rahîm olan Allah'ın adıyla",
        ),
        verse(
            1,
            2,
            r#"<span kok="حمد">الْحَمْدُ</span> <span kok="اله">لِلَّهِ</span> <span kok="ربب">رَبِّ</span> <span kok="علم">الْعَالَمِينَ</span>"#,
            "Hamd, alemlerin Rabbi olan Allah'a mahsustur",
        ),
    ];
    let words = vec![
        word(1, 1, 1, "بِسْمِ", "adıyla", "سمو"),
        word(1, 1, 2, "اللَّهِ", "Allah'ın", "اله"),
        word(1, 1, 3, "الرَّحْمَٰنِ", "Rahmân", "رحم"),
        word(1, 1, 4, "الرَّحِيمِ", "Rahîm", "رحم"),
        word(1, 2, 1, "الْحَمْدُ", "Hamd", "حمد"),
        word(1, 2, 2, "لِلَّهِ", "Allah'a", "اله"),
        word(1, 2, 3, "رَبِّ", "Rabbi", "ربب"),
        word(1, 2, 4, "الْعَالَمِينَ", "alemlerin", "علم"),
    ];
    (verses, words)
}

fn corpus() -> (Vec<Verse>, Vec<Word>) {
    let (mut verses, mut words) = fatiha();
    verses.push(verse(
        2,
        255,
        "اللَّهُ لَا إِلَٰهَ إِلَّا هُوَ الْحَيُّ الْقَيُّومُ",
        "Allah, kendisinden başka hiçbir ilah olmayandır",
    ));
    verses.push(verse(96, 1, "اقْرَأْ بِاسْمِ رَبِّكَ", "Yaratan Rabbinin adıyla oku"));
    verses.push(verse(96, 4, "الَّذِي عَلَّمَ بِالْقَلَمِ", "Ki o kalemle öğretti"));
    verses.push(verse(
        96,
        5,
        "عَلَّمَ الْإِنسَانَ مَا لَمْ يَعْلَمْ",
        "İnsana bilmediğini öğretti",
    ));
    words.extend([
        word(2, 255, 1, "اللَّهُ", "Allah", "اله"),
        word(2, 255, 2, "لَا", "yoktur", ""),
        word(2, 255, 3, "إِلَٰهَ", "ilah", "اله"),
        word(96, 1, 1, "اقْرَأْ", "oku", "قرا"),
        word(96, 1, 2, "بِاسْمِ", "adıyla", "سمو"),
        word(96, 1, 3, "رَبِّكَ", "Rabbinin", "ربب"),
        word(96, 4, 2, "عَلَّمَ", "öğretti", " علم "),
        word(96, 5, 1, "عَلَّمَ", "öğretti", "علم"),
        word(96, 5, 5, "يَعْلَمْ", "bilmediğini", "ع ل م"),
    ]);
    (verses, words)
}

fn index_of((verses, words): (Vec<Verse>, Vec<Word>)) -> CorpusIndex {
    build_index(&verses, &words, OrphanPolicy::Keep).unwrap()
}

fn run(index: &CorpusIndex, query: Query) -> Vec<VerseAddress> {
    search(&query, index, &EngineConfig::default()).unwrap().addresses()
}

#[test]
fn test_verse_address_queries() {
    let index = index_of(corpus());
    let results = search(&Query::new("2/255"), &index, &EngineConfig::default()).unwrap();
    assert_eq!(results.mode, SearchMode::VerseAddress);
    assert_eq!(results.total_hits, 1);
    assert_eq!(results.addresses(), vec![VerseAddress::new(2, 255)]);

    assert!(run(&index, Query::new("999/1")).is_empty());
}

#[test]
fn test_root_query_equals_manual_union() {
    let (verses, words) = corpus();
    let index = index_of((verses, words.clone()));

    let expected: BTreeSet<VerseAddress> = words
        .iter()
        .filter(|w| w.root.split_whitespace().collect::<String>() == "علم")
        .map(|w| w.verse_address())
        .collect();
    let found: BTreeSet<VerseAddress> = run(&index, Query::new("kök:علم")).into_iter().collect();
    assert_eq!(found, expected);
    assert_eq!(
        found.into_iter().collect::<Vec<_>>(),
        vec![VerseAddress::new(1, 2), VerseAddress::new(96, 4), VerseAddress::new(96, 5)]
    );

    let spaced: BTreeSet<VerseAddress> =
        run(&index, Query::new("kök: ع ل م ")).into_iter().collect();
    assert_eq!(spaced, expected);
}

#[test]
fn test_rahm_root_spans_first_two_verses() {
    let index = index_of(corpus());
    assert_eq!(run(&index, Query::new("kök:رحم")), vec![VerseAddress::new(1, 1)]);

    // a رحم word in 1/2 pulls that verse in as well
    let (verses, mut words) = corpus();
    words.push(word(1, 2, 5, "رحيم", "merhametli", "رحم"));
    let index = index_of((verses, words));
    assert_eq!(
        run(&index, Query::new("kök:رحم")),
        vec![VerseAddress::new(1, 1), VerseAddress::new(1, 2)]
    );
}

#[test]
fn test_turkish_allah_on_fatiha() {
    let index = index_of(fatiha());
    assert_eq!(
        run(&index, Query::new("t:Allah")),
        vec![VerseAddress::new(1, 1), VerseAddress::new(1, 2)]
    );
    assert_eq!(run(&index, Query::new("t:ALLAH")), run(&index, Query::new("t:allah")));
}

#[test]
fn test_pages_concatenate_to_results() {
    let index = index_of(corpus());
    let results = search(&Query::new("adıyla"), &index, &EngineConfig::default()).unwrap();
    assert_eq!(results.total_hits, 2);

    for size in 1..4 {
        let pages = page_count(results.matches.len(), size);
        let joined: Vec<VerseAddress> = (0..pages)
            .flat_map(|i| paginate(&results.matches, i, size).items.iter().map(|m| m.address))
            .collect();
        assert_eq!(joined, results.addresses());
    }
}

#[test]
fn test_multi_word_is_intersection_of_single_terms() {
    let index = index_of(corpus());
    for text in ["Allah olan", "adıyla Rabbinin", "Allah insana"] {
        let query = Query::new(text).with_mode(SearchMode::MultiWord);
        let multi: BTreeSet<VerseAddress> = run(&index, query).into_iter().collect();

        let mut terms = text.split_whitespace();
        let first = terms.next().unwrap();
        let mut expected: BTreeSet<VerseAddress> =
            run(&index, Query::new(first).with_mode(SearchMode::General)).into_iter().collect();
        for term in terms {
            let hits: BTreeSet<VerseAddress> =
                run(&index, Query::new(term).with_mode(SearchMode::General)).into_iter().collect();
            expected = expected.intersection(&hits).copied().collect();
        }
        assert_eq!(multi, expected, "{}", text);
    }
}

#[test]
fn test_invalid_regex_leaves_index_untouched() {
    let index = index_of(corpus());
    let before = index.clone();
    let query = Query::new("[unclosed").with_mode(SearchMode::Regex);
    let err = search(&query, &index, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, KuranError::InvalidQuery(_)));
    assert_eq!(index, before);
}

#[test]
fn test_build_determinism_and_address_consistency() {
    let (mut verses, mut words) = corpus();
    let first = build_index(&verses, &words, OrphanPolicy::Keep).unwrap();
    verses.reverse();
    words.reverse();
    let second = build_index(&verses, &words, OrphanPolicy::Keep).unwrap();
    assert_eq!(first, second);

    for w in first.words() {
        assert_eq!(first.word(w.address()), Some(w));
        assert!(first.verse(w.verse_address()).is_some());
    }
    for root in first.roots() {
        for addr in first.words_with_root(root).unwrap() {
            assert_eq!(first.word(*addr).unwrap().root.trim(), root);
        }
    }
}

#[test]
fn test_extract_root_is_idempotent_on_three_letters() {
    for word in ["والعالمين", "بالكتاب", "يعلمون", "المستقيم", "الرحمن", "فسيكفيكهم"] {
        let root = extract_arabic_root(word);
        if root.chars().count() == 3 {
            assert_eq!(extract_arabic_root(&root), root, "{}", word);
        }
    }
}

#[test]
fn test_session_round_trip() {
    let (verses, words) = corpus();
    let session =
        Session::new(verses, words, EngineConfig::default(), Arc::new(HeuristicOnly)).unwrap();

    let results = session.search(&Query::new("a:الله")).unwrap();
    assert!(results.addresses().contains(&VerseAddress::new(2, 255)));

    let report = session.root_report("العالمين");
    assert_eq!(report.root, "علم");
    assert_eq!(report.frequency, 4);

    let stats = session.verse_stats(VerseAddress::new(96, 1)).unwrap();
    assert_eq!(stats.word_count, 3);
    assert!(stats.related_verses.contains(&VerseAddress::new(1, 1)));
}
