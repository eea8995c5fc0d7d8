//! Plan catalog loading from config.toml
//!
//! The catalog lists the billing plans a fresh install starts with. Seeding
//! only inserts plans whose (type, level, period) triple is missing, so prices
//! edited in the database are never overwritten by the file.

use crate::{
    core::money::Money,
    entities::{BillingPeriod, PlanType, ServiceLevel},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Used when `CATALOG_PATH` is not set.
pub const DEFAULT_CATALOG_PATH: &str = "config.toml";

/// The whole catalog file.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Plans to seed
    #[serde(default)]
    pub plans: Vec<PlanConfig>,
}

/// One `[[plans]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct PlanConfig {
    /// Display name of the plan
    pub name: String,
    /// Sport, e.g. `"RUNNING"`
    pub plan_type: PlanType,
    /// Coaching tier, e.g. `"FOCUS"`
    pub service_level: ServiceLevel,
    /// `"MONTHLY"` or `"QUARTERLY"`
    pub billing_period: BillingPeriod,
    /// Price as a decimal string, e.g. `"2000.00"`
    pub base_price: Money,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Whether the plan can be sold (defaults to true)
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Loads the plan catalog from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or does not parse.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse plan catalog: {e}"),
    })
}

/// Like [`load_catalog`], but a missing file is `Ok(None)`.
pub fn load_catalog_if_present<P: AsRef<Path>>(path: P) -> Result<Option<Catalog>> {
    if !path.as_ref().exists() {
        return Ok(None);
    }
    load_catalog(path).map(Some)
}

/// Catalog path from `CATALOG_PATH`, or `config.toml` in the working directory.
#[must_use]
pub fn get_catalog_path() -> String {
    std::env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}
