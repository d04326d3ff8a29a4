//! Target catalog schema: option axes and the Shopify product-import row.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of one dimension of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisName {
    /// Placeholder axis for a product with no real variation.
    Title,
    /// Volume or weight sizes (`1 qt`, `500 g`).
    Size,
    /// Differences that are not measured sizes (pack counts, free-text labels).
    Variant,
    /// Distinct product lines bundled under one grouped parent.
    Product,
}

impl AxisName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AxisName::Title => "Title",
            AxisName::Size => "Size",
            AxisName::Variant => "Variant",
            AxisName::Product => "Product",
        }
    }
}

impl std::fmt::Display for AxisName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The option axes shared by every member of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSchema {
    pub axis1: AxisName,
    pub axis2: Option<AxisName>,
}

impl OptionSchema {
    /// `Title` / `Default Title`: the convention for a product without variants.
    pub const SINGLE: OptionSchema = OptionSchema {
        axis1: AxisName::Title,
        axis2: None,
    };

    #[must_use]
    pub fn one(axis1: AxisName) -> Self {
        Self { axis1, axis2: None }
    }

    #[must_use]
    pub fn two(axis1: AxisName, axis2: AxisName) -> Self {
        Self {
            axis1,
            axis2: Some(axis2),
        }
    }

    #[must_use]
    pub fn is_two_axis(&self) -> bool {
        self.axis2.is_some()
    }
}

/// One row of the Shopify product CSV.
///
/// The first row of a product carries the product-level columns (title, body,
/// vendor, option names, image, SEO); following rows for the same handle leave
/// them blank and only fill variant columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "Handle")]
    pub handle: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Body (HTML)")]
    pub body_html: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Product Category")]
    pub product_category: String,
    #[serde(rename = "Type")]
    pub product_type: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Published")]
    pub published: Option<bool>,
    #[serde(rename = "Option1 Name")]
    pub option1_name: String,
    #[serde(rename = "Option1 Value")]
    pub option1_value: String,
    #[serde(rename = "Option2 Name")]
    pub option2_name: String,
    #[serde(rename = "Option2 Value")]
    pub option2_value: String,
    #[serde(rename = "Variant SKU")]
    pub variant_sku: String,
    #[serde(rename = "Variant Grams")]
    pub variant_grams: Option<u32>,
    #[serde(rename = "Variant Inventory Tracker")]
    pub inventory_tracker: String,
    #[serde(rename = "Variant Inventory Qty")]
    pub inventory_qty: Option<i64>,
    #[serde(rename = "Variant Inventory Policy")]
    pub inventory_policy: String,
    #[serde(rename = "Variant Fulfillment Service")]
    pub fulfillment_service: String,
    #[serde(rename = "Variant Price")]
    pub price: Option<Decimal>,
    #[serde(rename = "Variant Compare At Price")]
    pub compare_at_price: Option<Decimal>,
    #[serde(rename = "Variant Requires Shipping")]
    pub requires_shipping: bool,
    #[serde(rename = "Variant Taxable")]
    pub taxable: bool,
    #[serde(rename = "Variant Barcode")]
    pub barcode: String,
    #[serde(rename = "Image Src")]
    pub image_src: String,
    #[serde(rename = "Image Position")]
    pub image_position: Option<u32>,
    #[serde(rename = "Image Alt Text")]
    pub image_alt_text: String,
    #[serde(rename = "SEO Title")]
    pub seo_title: String,
    #[serde(rename = "SEO Description")]
    pub seo_description: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl CatalogRow {
    /// `true` for the product-level row of a handle.
    #[must_use]
    pub fn is_title_row(&self) -> bool {
        !self.title.is_empty()
    }
}
