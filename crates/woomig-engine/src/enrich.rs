//! Best-effort enrichment collaborators: brand/category classification,
//! weight and price estimation, image lookup, and placeholder detection.
//!
//! Every collaborator is a trait so the pipeline can run against the
//! production tables, a tiny test table, or nothing at all. None of them can
//! fail at lookup time; a miss just leaves the field blank.

use std::collections::HashMap;

use regex::Regex;
use rust_decimal::Decimal;
use woomig_core::{CategoryValue, PatternLabel, Placeholders, TablesFile};

use crate::error::EngineError;
use crate::extract::SizeToken;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub brand: Option<String>,
    pub category: Option<String>,
}

pub trait Classifier {
    fn classify(&self, text: &str) -> Classification;
}

/// Fallback value for a record that lacks real data.
pub trait Estimator {
    type Value;

    fn estimate(&self, category: Option<&str>, size: Option<&SizeToken>) -> Option<Self::Value>;
}

pub trait ImageResolver {
    fn resolve_image(&self, handle: &str, title: &str) -> Option<String>;
}

struct Rule<T> {
    regex: Regex,
    value: T,
}

fn compile_rule<T: Clone>(
    section: &'static str,
    pattern: &str,
    value: &T,
) -> Result<Rule<T>, EngineError> {
    let regex = Regex::new(pattern).map_err(|source| EngineError::InvalidPattern {
        section,
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(Rule {
        regex,
        value: value.clone(),
    })
}

fn compile_labels(
    section: &'static str,
    rules: &[PatternLabel],
) -> Result<Vec<Rule<String>>, EngineError> {
    rules
        .iter()
        .map(|r| compile_rule(section, &r.pattern, &r.label))
        .collect()
}

fn compile_values<T: Clone>(
    section: &'static str,
    rules: &[CategoryValue<T>],
) -> Result<Vec<Rule<T>>, EngineError> {
    rules
        .iter()
        .map(|r| compile_rule(section, &r.category, &r.value))
        .collect()
}

fn first_match<'a, T>(rules: &'a [Rule<T>], text: &str) -> Option<&'a T> {
    rules
        .iter()
        .find(|rule| rule.regex.is_match(text))
        .map(|rule| &rule.value)
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Regex-table classifier; the first matching rule in each table wins.
pub struct TableClassifier {
    brands: Vec<Rule<String>>,
    categories: Vec<Rule<String>>,
}

impl TableClassifier {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if any rule fails to compile.
    pub fn new(brands: &[PatternLabel], categories: &[PatternLabel]) -> Result<Self, EngineError> {
        Ok(Self {
            brands: compile_labels("brands", brands)?,
            categories: compile_labels("categories", categories)?,
        })
    }
}

impl Classifier for TableClassifier {
    fn classify(&self, text: &str) -> Classification {
        Classification {
            brand: first_match(&self.brands, text).cloned(),
            category: first_match(&self.categories, text).cloned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Shipping weight in grams: computed from the size token when it is a volume
/// or weight, otherwise looked up by category.
pub struct WeightEstimator {
    by_category: Vec<Rule<f64>>,
}

impl WeightEstimator {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if any category rule fails to compile.
    pub fn new(rules: &[CategoryValue<f64>]) -> Result<Self, EngineError> {
        Ok(Self {
            by_category: compile_values("weights", rules)?,
        })
    }
}

impl Estimator for WeightEstimator {
    type Value = f64;

    fn estimate(&self, category: Option<&str>, size: Option<&SizeToken>) -> Option<f64> {
        let from_size = size.and_then(|size| {
            let grams = size.quantity_value()? * size.unit.approx_grams()?;
            (grams.is_finite() && grams > 0.0).then_some(grams)
        });
        from_size.or_else(|| category.and_then(|c| first_match(&self.by_category, c).copied()))
    }
}

/// Price by category only; a size alone says nothing about price.
pub struct PriceEstimator {
    by_category: Vec<Rule<Decimal>>,
}

impl PriceEstimator {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if any category rule fails to compile.
    pub fn new(rules: &[CategoryValue<Decimal>]) -> Result<Self, EngineError> {
        Ok(Self {
            by_category: compile_values("prices", rules)?,
        })
    }
}

impl Estimator for PriceEstimator {
    type Value = Decimal;

    fn estimate(&self, category: Option<&str>, _size: Option<&SizeToken>) -> Option<Decimal> {
        category.and_then(|c| first_match(&self.by_category, c).copied())
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Image URLs recovered from an earlier export, keyed by handle.
#[derive(Debug, Clone, Default)]
pub struct BackupImageCatalog {
    by_handle: HashMap<String, String>,
}

impl BackupImageCatalog {
    /// Builds the catalog; blank entries are skipped and the first URL for a
    /// handle wins.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut by_handle = HashMap::new();
        for (handle, url) in entries {
            let (handle, url) = (handle.trim(), url.trim());
            if handle.is_empty() || url.is_empty() {
                continue;
            }
            by_handle
                .entry(handle.to_lowercase())
                .or_insert_with(|| url.to_string());
        }
        Self { by_handle }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

impl ImageResolver for BackupImageCatalog {
    fn resolve_image(&self, handle: &str, _title: &str) -> Option<String> {
        self.by_handle.get(&handle.to_lowercase()).cloned()
    }
}

/// Resolver used when no backup catalog is configured.
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve_image(&self, _handle: &str, _title: &str) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Recognizes auto-generated SKUs and stock "no image" URLs.
#[derive(Debug, Clone)]
pub struct PlaceholderMatcher {
    sku: Vec<Regex>,
    image: Vec<Regex>,
}

impl PlaceholderMatcher {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if any pattern fails to compile.
    pub fn new(placeholders: &Placeholders) -> Result<Self, EngineError> {
        let compile = |section: &'static str, patterns: &[String]| {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|source| EngineError::InvalidPattern {
                        section,
                        pattern: p.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            sku: compile("placeholders.sku", &placeholders.sku)?,
            image: compile("placeholders.image", &placeholders.image)?,
        })
    }

    #[must_use]
    pub fn is_placeholder_sku(&self, sku: &str) -> bool {
        self.sku.iter().any(|re| re.is_match(sku))
    }

    #[must_use]
    pub fn is_placeholder_image(&self, url: &str) -> bool {
        self.image.iter().any(|re| re.is_match(url))
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Everything the emitter and conflict resolver consult, built once per run.
pub struct Enrichment {
    pub classifier: Box<dyn Classifier>,
    pub weights: Box<dyn Estimator<Value = f64>>,
    pub prices: Box<dyn Estimator<Value = Decimal>>,
    pub images: Box<dyn ImageResolver>,
    pub placeholders: PlaceholderMatcher,
}

impl Enrichment {
    /// Compiles the lookup tables; images resolve to nothing until
    /// [`Enrichment::with_images`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if any table pattern fails to compile.
    pub fn from_tables(tables: &TablesFile) -> Result<Self, EngineError> {
        Ok(Self {
            classifier: Box::new(TableClassifier::new(&tables.brands, &tables.categories)?),
            weights: Box::new(WeightEstimator::new(&tables.weights)?),
            prices: Box::new(PriceEstimator::new(&tables.prices)?),
            images: Box::new(NoImages),
            placeholders: PlaceholderMatcher::new(&tables.placeholders)?,
        })
    }

    #[must_use]
    pub fn with_images(mut self, images: impl ImageResolver + 'static) -> Self {
        self.images = Box::new(images);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Unit;

    fn label(pattern: &str, label: &str) -> PatternLabel {
        PatternLabel {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }

    fn size(quantity: &str, unit: Unit) -> SizeToken {
        SizeToken {
            quantity: quantity.to_string(),
            unit,
        }
    }

    #[test]
    fn classifier_first_rule_wins() {
        let classifier = TableClassifier::new(
            &[
                label(r"(?i)\bflora(gro|bloom|micro)\b", "General Hydroponics"),
                label(r"(?i)\bflora", "Other Flora"),
            ],
            &[label(r"(?i)\b(nutrient|flora)", "Nutrients & Additives")],
        )
        .unwrap();
        let c = classifier.classify("FloraGro 1 qt");
        assert_eq!(c.brand.as_deref(), Some("General Hydroponics"));
        assert_eq!(c.category.as_deref(), Some("Nutrients & Additives"));
    }

    #[test]
    fn classifier_miss_leaves_fields_blank() {
        let classifier = TableClassifier::new(&[label("(?i)canna", "Canna")], &[]).unwrap();
        assert_eq!(classifier.classify("Trellis Net"), Classification::default());
    }

    #[test]
    fn classifier_rejects_invalid_pattern() {
        let err = TableClassifier::new(&[label("(unclosed", "X")], &[])
            .err()
            .expect("should fail");
        assert!(err.to_string().contains("brands"), "got: {err}");
    }

    #[test]
    fn weight_from_size_token() {
        let estimator = WeightEstimator::new(&[]).unwrap();
        let grams = estimator
            .estimate(None, Some(&size("2", Unit::Pound)))
            .unwrap();
        assert!((grams - 907.184).abs() < 1e-6);
    }

    #[test]
    fn weight_falls_back_to_category() {
        let estimator = WeightEstimator::new(&[CategoryValue {
            category: "(?i)lighting".to_string(),
            value: 2500.0,
        }])
        .unwrap();
        assert_eq!(
            estimator.estimate(Some("Lighting > LED"), Some(&size("10", Unit::Pack))),
            Some(2500.0)
        );
        assert_eq!(estimator.estimate(Some("Seeds"), None), None);
    }

    #[test]
    fn price_only_uses_category() {
        let estimator = PriceEstimator::new(&[CategoryValue {
            category: "(?i)nutrient".to_string(),
            value: Decimal::new(1999, 2),
        }])
        .unwrap();
        assert_eq!(
            estimator.estimate(Some("Nutrients"), None),
            Some(Decimal::new(1999, 2))
        );
        assert_eq!(estimator.estimate(None, Some(&size("1", Unit::Gallon))), None);
    }

    #[test]
    fn backup_catalog_matches_handle_case_insensitively() {
        let catalog = BackupImageCatalog::new([
            ("FloraGro".to_string(), "https://cdn.example/fg.jpg".to_string()),
            ("floragro".to_string(), "https://cdn.example/other.jpg".to_string()),
            (String::new(), "https://cdn.example/orphan.jpg".to_string()),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.resolve_image("floragro", "FloraGro").as_deref(),
            Some("https://cdn.example/fg.jpg")
        );
        assert!(catalog.resolve_image("floranova", "FloraNova").is_none());
    }

    #[test]
    fn default_placeholders_detect_generated_values() {
        let matcher = PlaceholderMatcher::new(&Placeholders::default()).unwrap();
        assert!(matcher.is_placeholder_sku("AUTO-1234"));
        assert!(matcher.is_placeholder_sku("woo-991"));
        assert!(!matcher.is_placeholder_sku("FG-GAL"));
        assert!(matcher.is_placeholder_image(
            "https://shop.example/wp-content/uploads/woocommerce-placeholder.png"
        ));
        assert!(!matcher.is_placeholder_image("https://cdn.example/fg.jpg"));
    }

    #[test]
    fn enrichment_from_empty_tables() {
        let enrichment = Enrichment::from_tables(&TablesFile::default()).unwrap();
        assert_eq!(enrichment.classifier.classify("anything"), Classification::default());
        assert!(enrichment.images.resolve_image("x", "X").is_none());
    }
}
