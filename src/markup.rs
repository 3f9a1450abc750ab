//! Parser for the inline word markup embedded in verse Arabic text
//!
//! Source verses carry one `<span ... kok="ROOT">WORD</span>` element per
//! word. This module turns that into `(surface, root)` pairs so the rest of
//! the crate never touches raw markup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupWord {
    pub surface: String,
    pub root: Option<String>,
}

#[derive(Debug)]
struct Tag<'a> {
    name: &'a str,
    closing: bool,
    attrs: Vec<(&'a str, &'a str)>,
}

impl<'a> Tag<'a> {
    fn root_attr(&self) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|(name, _)| {
                name.eq_ignore_ascii_case("kok")
                    || name.eq_ignore_ascii_case("root")
                    || name.to_ascii_lowercase().ends_with("-kok")
            })
            .map(|(_, value)| *value)
    }
}

/// Parse the inside of `<...>` (without the angle brackets).
fn parse_tag(inner: &str) -> Option<Tag<'_>> {
    let inner = inner.trim();
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, inner),
    };
    let rest = rest.trim_end_matches('/');

    let name_end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut attrs = Vec::new();
    let mut s = &rest[name_end..];
    loop {
        s = s.trim_start();
        if s.is_empty() {
            break;
        }
        let key_end = s
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(s.len());
        let key = &s[..key_end];
        s = s[key_end..].trim_start();

        let Some(after_eq) = s.strip_prefix('=') else {
            // bare attribute such as `hidden`
            attrs.push((key, ""));
            continue;
        };
        let after_eq = after_eq.trim_start();

        let (value, remaining) = match after_eq.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                match body.find(q) {
                    Some(end) => (&body[..end], &body[end + 1..]),
                    None => (body, ""),
                }
            }
            _ => {
                let end = after_eq
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        attrs.push((key, value));
        s = remaining;
    }

    Some(Tag { name, closing, attrs })
}

/// Walk the markup, yielding text runs and tags in order.
enum Piece<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

fn pieces(markup: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = markup;
    while !rest.is_empty() {
        match rest.find('<') {
            Some(0) => match rest.find('>') {
                Some(end) => {
                    if let Some(tag) = parse_tag(&rest[1..end]) {
                        out.push(Piece::Tag(tag));
                    }
                    rest = &rest[end + 1..];
                }
                None => {
                    // unterminated tag: treat the remainder as text
                    out.push(Piece::Text(rest));
                    break;
                }
            },
            Some(start) => {
                out.push(Piece::Text(&rest[..start]));
                rest = &rest[start..];
            }
            None => {
                out.push(Piece::Text(rest));
                break;
            }
        }
    }
    out
}

/// Every `<span>` whose content is plain, non-empty text becomes a word.
pub fn parse_words(markup: &str) -> Vec<MarkupWord> {
    let pieces = pieces(markup);
    let mut words = Vec::new();

    let mut i = 0;
    while i < pieces.len() {
        if let Piece::Tag(open) = &pieces[i] {
            if !open.closing && open.name.eq_ignore_ascii_case("span") {
                if let (Some(Piece::Text(text)), Some(Piece::Tag(close))) =
                    (pieces.get(i + 1), pieces.get(i + 2))
                {
                    if close.closing && close.name.eq_ignore_ascii_case("span") {
                        let surface = text.trim();
                        if !surface.is_empty() {
                            words.push(MarkupWord {
                                surface: surface.to_string(),
                                root: open
                                    .root_attr()
                                    .map(str::trim)
                                    .filter(|r| !r.is_empty())
                                    .map(str::to_string),
                            });
                        }
                        i += 3;
                        continue;
                    }
                }
            }
        }
        i += 1;
    }

    words
}

/// Text with all tags removed.
pub fn plain_text(markup: &str) -> String {
    if !markup.contains('<') {
        return markup.to_string();
    }
    pieces(markup)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Text(text) => Some(text),
            Piece::Tag(_) => None,
        })
        .collect()
}

/// Words of the verse, falling back to whitespace tokens when the text
/// carries no markup.
pub fn verse_words(markup: &str) -> Vec<String> {
    let words = parse_words(markup);
    if words.is_empty() {
        plain_text(markup)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    } else {
        words.into_iter().map(|w| w.surface).collect()
    }
}

/// Roots compare with internal spaces removed (`ع ل م` == `علم`).
pub fn compact_root(root: &str) -> String {
    root.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSE: &str = r#"<span class="k" kok="سمو">بِسْمِ</span> <span class="k" kok="اله">اللَّهِ</span> <span kok='رحم'>الرَّحْمَٰنِ</span> <span>الرَّحِيمِ</span>"#;

    #[test]
    fn test_parse_words() {
        let words = parse_words(VERSE);
        assert_eq!(words.len(), 4);
        assert_eq!(words[0].surface, "بِسْمِ");
        assert_eq!(words[0].root.as_deref(), Some("سمو"));
        assert_eq!(words[2].root.as_deref(), Some("رحم"));
        assert_eq!(words[3].root, None);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<b>a</b> <span kok=\"x\">b</span>"), "a b");
        assert_eq!(plain_text("no markup"), "no markup");
    }

    #[test]
    fn test_nested_span_is_skipped() {
        let words = parse_words("<span kok=\"a\"><b>x</b></span><span>y</span>");
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].surface, "y");
    }

    #[test]
    fn test_unterminated_tag() {
        assert!(parse_words("<span kok=\"a\">x</span").is_empty());
        assert_eq!(plain_text("abc <span"), "abc <span");
    }

    #[test]
    fn test_verse_words_fallback() {
        assert_eq!(verse_words("قل هو الله"), vec!["قل", "هو", "الله"]);
        assert_eq!(verse_words(VERSE).len(), 4);
    }

    #[test]
    fn test_compact_root() {
        assert_eq!(compact_root("ع ل م"), "علم");
        assert_eq!(compact_root(" علم "), "علم");
        assert_eq!(compact_root("رحم"), "رحم");
    }
}
