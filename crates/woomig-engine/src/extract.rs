//! Splits a product title into a base name and a size token.
//!
//! Patterns run against the entity-decoded title so the base name keeps its
//! original case and spacing; every pattern is case-insensitive and
//! whitespace-tolerant, which makes matching equivalent to matching the
//! normalized text. The first pattern that matches anywhere in the title
//! wins; there is no scoring across patterns.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::normalize::{collapse_whitespace, decode_entities, normalize_text};

const NUM: &str = r"\d+/\d+|\d+(?:\.\d+)?";
const UNIT: &str = r"gallons?|gal|quarts?|qts?|pints?|pts?|fl\.?\s?oz|ounces?|oz|litres?|liters?|milliliters?|millilitres?|ml|pounds?|lbs?|kilograms?|kgs?|grams?|g|l|packs?|pk|count|ct|each|ea";
/// Units read as a size without a number. Words like `oz` or `pound` end
/// ordinary titles too often ("Wizard of Oz") to qualify.
const BARE_UNIT: &str = r"gallons?|gal|quarts?|qts?";

/// Base names this short (after normalization) are treated as a size-only
/// title and the match is rejected.
const MIN_BASE_CHARS: usize = 3;

static PARENTHESIZED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\(\s*(?P<qty>{NUM})\s*(?P<unit>{UNIT})\b\.?(?:\s+[^()]*)?\)"
    ))
    .expect("valid parenthesized size regex")
});
static COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?P<qty>{NUM})(?P<unit>{UNIT})\b\.?"))
        .expect("valid compact size regex")
});
static SPACED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:[-/\u{{2013}}\u{{2014}}]\s*)?\b(?P<qty>{NUM})\s+(?P<unit>{UNIT})\b\.?"
    ))
    .expect("valid spaced size regex")
});
static UNIT_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\s(?P<unit>{BARE_UNIT})\.?\s*$")).expect("valid unit-only regex")
});

/// Canonical size unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Gallon,
    Quart,
    Pint,
    Liter,
    Milliliter,
    Ounce,
    Pound,
    Kilogram,
    Gram,
    Pack,
    Count,
    Each,
}

impl Unit {
    /// Maps a matched unit spelling (`"Gallons"`, `"fl. oz"`, `"L"`) to its unit.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let unit = match key.as_str() {
            "gallon" | "gallons" | "gal" => Unit::Gallon,
            "quart" | "quarts" | "qt" | "qts" => Unit::Quart,
            "pint" | "pints" | "pt" | "pts" => Unit::Pint,
            "liter" | "liters" | "litre" | "litres" | "l" => Unit::Liter,
            "milliliter" | "milliliters" | "millilitre" | "millilitres" | "ml" => {
                Unit::Milliliter
            }
            "ounce" | "ounces" | "oz" | "floz" => Unit::Ounce,
            "pound" | "pounds" | "lb" | "lbs" => Unit::Pound,
            "kilogram" | "kilograms" | "kg" | "kgs" => Unit::Kilogram,
            "gram" | "grams" | "g" => Unit::Gram,
            "pack" | "packs" | "pk" => Unit::Pack,
            "count" | "ct" => Unit::Count,
            "each" | "ea" => Unit::Each,
            _ => return None,
        };
        Some(unit)
    }

    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Unit::Gallon => "gal",
            Unit::Quart => "qt",
            Unit::Pint => "pt",
            Unit::Liter => "L",
            Unit::Milliliter => "ml",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Pack => "pack",
            Unit::Count => "ct",
            Unit::Each => "each",
        }
    }

    /// `true` for volume and weight units; count units are not sizes.
    #[must_use]
    pub fn is_measure(self) -> bool {
        !matches!(self, Unit::Pack | Unit::Count | Unit::Each)
    }

    /// Approximate grams for one unit, used for shipping-weight estimates.
    /// Volumes assume a water-like density.
    #[must_use]
    pub fn approx_grams(self) -> Option<f64> {
        match self {
            Unit::Gallon => Some(3785.41),
            Unit::Quart => Some(946.353),
            Unit::Pint => Some(473.176),
            Unit::Liter => Some(1000.0),
            Unit::Milliliter | Unit::Gram => Some(1.0),
            Unit::Ounce => Some(28.3495),
            Unit::Pound => Some(453.592),
            Unit::Kilogram => Some(1000.0),
            Unit::Pack | Unit::Count | Unit::Each => None,
        }
    }
}

/// Quantity plus unit, rendered as `"<quantity> <unit>"` (`"1 gal"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeToken {
    pub quantity: String,
    pub unit: Unit,
}

impl SizeToken {
    /// Numeric quantity; fractions like `1/2` are evaluated.
    #[must_use]
    pub fn quantity_value(&self) -> Option<f64> {
        match self.quantity.split_once('/') {
            Some((num, den)) => {
                let den = den.parse::<f64>().ok().filter(|d| *d != 0.0)?;
                Some(num.parse::<f64>().ok()? / den)
            }
            None => self.quantity.parse::<f64>().ok(),
        }
    }
}

impl std::fmt::Display for SizeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.quantity, self.unit.abbreviation())
    }
}

/// Where a size pattern matched in the decoded title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSpan {
    /// Byte offset where the match (including any leading separator) starts.
    pub start: usize,
    pub size: SizeToken,
}

/// Result of trying the size patterns in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeMatch {
    NoMatch,
    /// `(1 qt)`, `(130g powder)`
    Parenthesized(SizeSpan),
    /// `6oz`, `500g`
    Compact(SizeSpan),
    /// `1 gal`, `- 5 gal`, `/ 2.5 L.`
    Spaced(SizeSpan),
    /// Trailing unit without a number (`... Gallon`); quantity is 1.
    UnitOnly(SizeSpan),
}

impl SizeMatch {
    /// Runs the patterns against a decoded title; first match wins.
    #[must_use]
    pub fn detect(title: &str) -> Self {
        capture(&PARENTHESIZED_RE, title)
            .map(SizeMatch::Parenthesized)
            .or_else(|| capture(&COMPACT_RE, title).map(SizeMatch::Compact))
            .or_else(|| capture(&SPACED_RE, title).map(SizeMatch::Spaced))
            .or_else(|| capture(&UNIT_ONLY_RE, title).map(SizeMatch::UnitOnly))
            .unwrap_or(SizeMatch::NoMatch)
    }

    #[must_use]
    pub fn span(&self) -> Option<&SizeSpan> {
        match self {
            SizeMatch::NoMatch => None,
            SizeMatch::Parenthesized(span)
            | SizeMatch::Compact(span)
            | SizeMatch::Spaced(span)
            | SizeMatch::UnitOnly(span) => Some(span),
        }
    }
}

fn capture(re: &Regex, title: &str) -> Option<SizeSpan> {
    let caps: Captures<'_> = re.captures(title)?;
    let whole = caps.get(0)?;
    let unit = Unit::parse(caps.name("unit")?.as_str())?;
    let quantity = caps
        .name("qty")
        .map_or_else(|| "1".to_string(), |m| m.as_str().to_string());
    Some(SizeSpan {
        start: whole.start(),
        size: SizeToken { quantity, unit },
    })
}

/// A title split into its family-identifying part and its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedName {
    /// Normalized base name; the grouping key.
    pub base_name: String,
    /// Base name as written (entities decoded, whitespace collapsed).
    pub display_base: String,
    /// Full title as written (entities decoded, whitespace collapsed).
    pub display_name: String,
    pub size: Option<SizeToken>,
}

impl ExtractedName {
    fn without_size(display_name: String) -> Self {
        Self {
            base_name: normalize_text(&display_name),
            display_base: display_name.clone(),
            display_name,
            size: None,
        }
    }
}

/// Extracts base name and size token from a raw product title.
///
/// A match whose remaining base name is two characters or fewer is rejected
/// and the title is treated as having no size. A bare number without a unit
/// is never a size.
#[must_use]
pub fn extract(raw_name: &str) -> ExtractedName {
    let display_name = collapse_whitespace(&decode_entities(raw_name));
    let Some(span) = SizeMatch::detect(&display_name).span().cloned() else {
        return ExtractedName::without_size(display_name);
    };

    let display_base = display_name[..span.start]
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '/' | ',' | ':' | '(' | '\u{2013}' | '\u{2014}')
        })
        .to_string();
    let base_name = normalize_text(&display_base);
    if base_name.chars().count() < MIN_BASE_CHARS {
        return ExtractedName::without_size(display_name);
    }

    ExtractedName {
        base_name,
        display_base,
        display_name,
        size: Some(span.size),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
