//! Text canonicalization shared by every matching step.
//!
//! [`decode_entities`] only undoes HTML escaping and is safe for display
//! text. [`normalize_text`] goes further (case folding, diacritic stripping,
//! ASCII punctuation, single spaces) and is only ever used for comparison keys.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid entity regex")
});

/// Decodes decimal, hex and the supported named HTML entities.
///
/// Decoding repeats until nothing changes so double-escaped exports
/// (`&amp;amp;`) come out clean. Unknown entities and invalid code points are
/// left as written.
#[must_use]
pub fn decode_entities(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = ENTITY_RE
            .replace_all(&current, |caps: &Captures| {
                decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Canonical comparison form of a product text.
///
/// Decodes entities, lower-cases, strips diacritics (NFD then drop combining
/// marks), maps typographic quotes and dashes to ASCII and collapses
/// whitespace. Applying it twice gives the same result as applying it once.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let mut current = normalize_once(raw);
    // Stripping marks can splice a new entity together (`&am\u{301}p;`).
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Collapses runs of whitespace to one space and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_once(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let mut folded = String::with_capacity(decoded.len());
    for c in decoded.to_lowercase().nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match canonical_punctuation(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }
    collapse_whitespace(&folded)
}

fn canonical_punctuation(c: char) -> Option<&'static str> {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '`' => Some("'"),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
        | '\u{00BB}' => Some("\""),
        '\u{2010}'..='\u{2015}' | '\u{2212}' => Some("-"),
        '\u{2026}' => Some("..."),
        _ => None,
    }
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code).filter(|c| *c != '\0');
    }
    let c = match body.to_ascii_lowercase().as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // decode_entities
    // -----------------------------------------------------------------------

    #[test]
    fn decodes_named_entities() {
        assert_eq!(decode_entities("Fox &amp; Farm"), "Fox & Farm");
        assert_eq!(decode_entities("&lt;b&gt;"), "<b>");
        assert_eq!(decode_entities("Grower&rsquo;s Choice"), "Grower\u{2019}s Choice");
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(decode_entities("Grower&#8217;s"), "Grower\u{2019}s");
        assert_eq!(decode_entities("Size &#x2013; 1 qt"), "Size \u{2013} 1 qt");
        assert_eq!(decode_entities("&#X41;"), "A");
    }

    #[test]
    fn decodes_double_escaped_entities() {
        assert_eq!(decode_entities("Fox &amp;amp; Farm"), "Fox & Farm");
    }

    #[test]
    fn named_entities_match_case_insensitively() {
        assert_eq!(decode_entities("A &AMP; B"), "A & B");
    }

    #[test]
    fn leaves_unknown_and_invalid_entities() {
        assert_eq!(decode_entities("&copy; 2024"), "&copy; 2024");
        assert_eq!(decode_entities("&#0;"), "&#0;");
        assert_eq!(decode_entities("&#55296;"), "&#55296;");
    }

    #[test]
    fn decode_preserves_case_and_spacing() {
        assert_eq!(decode_entities("FloraGro  1 QT"), "FloraGro  1 QT");
    }

    // -----------------------------------------------------------------------
    // normalize_text
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_text("  FloraGro \t 1   QT "), "floragro 1 qt");
    }

    #[test]
    fn normalize_strips_diacritics() {
        assert_eq!(normalize_text("Crème Brûlée"), "creme brulee");
        assert_eq!(normalize_text("Cr&#233;me"), "creme");
    }

    #[test]
    fn normalize_canonicalizes_quotes_and_dashes() {
        assert_eq!(
            normalize_text("Grower\u{2019}s \u{201C}Best\u{201D} \u{2014} 1 gal"),
            "grower's \"best\" - 1 gal"
        );
        assert_eq!(normalize_text("Wait&hellip;"), "wait...");
    }

    #[test]
    fn normalize_treats_nbsp_as_space() {
        assert_eq!(normalize_text("Big&nbsp;Bud"), "big bud");
    }

    #[test]
    fn normalize_empty_input_is_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Fox &amp;amp; Farm",
            "A &AMP; B",
            "&am\u{301}p;",
            "Crème &#x2014; Brûlée\u{2026}",
            "  İstanbul  Ǆ ",
            "&copy; &#0; &#55296;",
            "Grower&rsquo;s &ldquo;Mix&rdquo;",
            "",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn collapse_whitespace_trims() {
        assert_eq!(collapse_whitespace("  a \n b  "), "a b");
    }
}
