//! Text normalization shared by indexing, search and statistics

/// Quote characters removed by both normalizers.
const QUOTES: [char; 6] = ['\'', '"', '‘', '’', '“', '”'];

fn is_arabic_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

fn is_stripped_symbol(c: char) -> bool {
    c == '%' || c == '&' || QUOTES.contains(&c)
}

/// Remove Arabic diacritics, `%`, `&` and quotes; lower-case Latin letters.
pub fn normalize_arabic(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_arabic_diacritic(c) && !is_stripped_symbol(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Remove `%`, `&`, quotes, whitespace, `-` and `_`, then lower-case with
/// Turkish rules.
pub fn normalize_turkish(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|&c| !is_stripped_symbol(c) && !c.is_whitespace() && c != '-' && c != '_')
        .collect();
    turkish_lowercase(&stripped)
}

/// Lower-case distinguishing dotted and dotless I (`I` → `ı`, `İ` → `i`).
pub fn turkish_lowercase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'I' => out.push('ı'),
            'İ' => out.push('i'),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// True for codepoints of the Arabic block (U+0600–U+06FF).
pub fn is_arabic_block(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

fn is_token_separator(c: char) -> bool {
    c.is_whitespace() || (c.is_ascii_punctuation() && c != '\'') || "،؛؟«»…".contains(c)
}

/// Split translation text on whitespace and punctuation. Apostrophes stay
/// inside a token so suffixed forms like `Allah'ın` remain one word.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(is_token_separator)
        .map(|token| token.trim_matches(|c: char| QUOTES.contains(&c)))
        .filter(|token| !token.is_empty())
        .collect()
}
