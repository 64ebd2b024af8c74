//! Configuration for the analytics: crop economics and budget fallbacks.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The expected yield and sale price of one crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropEconomics {
    /// Units harvested per crop planting at full maturity.
    pub base_yield: f64,
    /// Sale price per unit.
    pub price: f64,
}

/// Lookup table from crop name to [CropEconomics].
///
/// Names are matched case-insensitively, ignoring surrounding whitespace.
/// Crops missing from the table use the `default` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropTable {
    crops: BTreeMap<String, CropEconomics>,
    default: CropEconomics,
}

impl CropTable {
    /// Create a table from named entries and a fallback for unlisted crops.
    pub fn new(
        crops: impl IntoIterator<Item = (String, CropEconomics)>,
        default: CropEconomics,
    ) -> Self {
        Self {
            crops: crops.into_iter().collect(),
            default,
        }
    }

    /// The economics for the crop called `name`.
    pub fn lookup(&self, name: &str) -> CropEconomics {
        let name = name.trim();

        self.crops
            .iter()
            .find(|(crop_name, _)| crop_name.trim().eq_ignore_ascii_case(name))
            .map_or(self.default, |(_, economics)| *economics)
    }
}

impl Default for CropTable {
    fn default() -> Self {
        let entry = |name: &str, base_yield: f64, price: f64| {
            (name.to_owned(), CropEconomics { base_yield, price })
        };

        Self::new(
            [
                entry("Corn", 180.0, 5.50),
                entry("Wheat", 60.0, 7.00),
                entry("Soybeans", 50.0, 12.00),
                entry("Tomatoes", 250.0, 2.50),
                entry("Lettuce", 150.0, 1.75),
            ],
            CropEconomics {
                base_yield: 100.0,
                price: 5.00,
            },
        )
    }
}

/// Settings for the analytics pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Yields and prices used for profit projections.
    pub crop_table: CropTable,
    /// The total budget the expenses page compares the selected spending
    /// against, regardless of the stored budgets.
    pub default_total_budget: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            crop_table: CropTable::default(),
            default_total_budget: 50_000.0,
        }
    }
}

impl AnalyticsConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [Error::ConfigFile] if `text` is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|error| Error::ConfigFile(error.to_string()))
    }

    /// Read a configuration from the JSON file at `path`.
    ///
    /// # Errors
    /// Returns [Error::ConfigFile] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)
            .map_err(|error| Error::ConfigFile(format!("{}: {error}", path.display())))?;

        Self::from_json(&text)
    }
}
