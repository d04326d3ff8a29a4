use std::path::PathBuf;
use std::str::FromStr;

/// Unit of the source catalog's weight column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Pounds,
    Kilograms,
    Grams,
    Ounces,
}

impl WeightUnit {
    /// Grams per one unit of `self`.
    #[must_use]
    pub fn grams_factor(self) -> f64 {
        match self {
            WeightUnit::Pounds => 453.592,
            WeightUnit::Kilograms => 1000.0,
            WeightUnit::Grams => 1.0,
            WeightUnit::Ounces => 28.3495,
        }
    }

    /// Converts a weight expressed in `self` into grams.
    #[must_use]
    pub fn to_grams(self, value: f64) -> f64 {
        value * self.grams_factor()
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Pounds),
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kilograms),
            "g" | "gram" | "grams" => Ok(WeightUnit::Grams),
            "oz" | "ounce" | "ounces" => Ok(WeightUnit::Ounces),
            other => Err(format!("unknown weight unit '{other}'; expected lbs, kg, g or oz")),
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightUnit::Pounds => write!(f, "lbs"),
            WeightUnit::Kilograms => write!(f, "kg"),
            WeightUnit::Grams => write!(f, "g"),
            WeightUnit::Ounces => write!(f, "oz"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// YAML file holding brand/category/estimator/placeholder tables.
    pub tables_path: PathBuf,
    /// Separator used by the source's grouped-product child list.
    pub child_delimiter: String,
    pub weight_unit: WeightUnit,
    /// Option values longer than this are cut and suffixed with `...`.
    pub option_max_len: usize,
    pub handle_max_len: usize,
}
