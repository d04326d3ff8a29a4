use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position of a [`RawRecord`] in the source table.
///
/// Every derived structure refers back to source rows through this id; the
/// records themselves are never copied or mutated after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub usize);

impl RecordId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One row of the source catalog, as read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Raw product title; may still contain HTML entities.
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub stock_qty: Option<i64>,
    pub weight_grams: Option<f64>,
    pub barcode: Option<String>,
    pub vendor: Option<String>,
    /// Category breadcrumb, e.g. `"Nutrients > Base Nutrients"`.
    pub category_path: Option<String>,
    /// Comma-separated tag list, passed through verbatim.
    pub tags: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Child names listed by a grouped container, in source order. Empty for
    /// ordinary products.
    #[serde(default)]
    pub explicit_children: Vec<String>,
}

impl RawRecord {
    /// A record carrying only a name, handy as a starting point for fixtures.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// `true` when the record lists explicit children.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !self.explicit_children.is_empty()
    }

    /// Price, if present and non-zero.
    #[must_use]
    pub fn real_price(&self) -> Option<Decimal> {
        self.price.filter(|p| !p.is_zero())
    }

    /// Trimmed SKU, treating empty strings as absent.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        non_blank(self.sku.as_deref())
    }

    #[must_use]
    pub fn vendor(&self) -> Option<&str> {
        non_blank(self.vendor.as_deref())
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        non_blank(self.image_url.as_deref())
    }

    #[must_use]
    pub fn barcode(&self) -> Option<&str> {
        non_blank(self.barcode.as_deref())
    }

    #[must_use]
    pub fn category_path(&self) -> Option<&str> {
        non_blank(self.category_path.as_deref())
    }

    #[must_use]
    pub fn tags(&self) -> Option<&str> {
        non_blank(self.tags.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Identity of a product family: normalized vendor plus normalized base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FamilyKey {
    pub vendor: String,
    pub base_name: String,
}

impl FamilyKey {
    #[must_use]
    pub fn new(vendor: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            base_name: base_name.into(),
        }
    }
}

impl std::fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.vendor.is_empty() {
            write!(f, "{}", self.base_name)
        } else {
            write!(f, "{}/{}", self.vendor, self.base_name)
        }
    }
}
