//! Query tunables.
//!
//! Settings are read from TOML (`config/default.toml` ships the
//! defaults) and can be overridden from the environment. They are passed
//! to the pipeline explicitly; nothing here is global.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`QuerySettings::max_results`].
pub const MAX_RESULTS_ENV: &str = "ANSHIN_NAVI_MAX_RESULTS";

/// Default settings file, embedded at compile time.
pub const DEFAULT_SETTINGS_TOML: &str = include_str!("../config/default.toml");

const DEFAULT_MAX_RESULTS: usize = 200;
const DEFAULT_RADIUS_METERS: f64 = 2_000.0;
const DEFAULT_SPATIAL_INDEX_MIN_RECORDS: usize = 1_024;

/// Errors from reading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for [`QuerySettings`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value was parsed but is out of range.
    #[error("Invalid setting {field}: {message}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Description of what went wrong.
        message: String,
    },
}

/// Tunables for the filter and rank pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Maximum number of facilities materialized per result list.
    pub max_results: usize,
    /// Radius for "near me" queries when the caller gives none.
    pub default_radius_meters: f64,
    /// Whether radius queries go through the R-tree.
    pub use_spatial_index: bool,
    /// Catalogs smaller than this are always scanned.
    pub spatial_index_min_records: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            default_radius_meters: DEFAULT_RADIUS_METERS,
            use_spatial_index: true,
            spatial_index_min_records: DEFAULT_SPATIAL_INDEX_MIN_RECORDS,
        }
    }
}

impl QuerySettings {
    /// Parses settings from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of
    /// range.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::de::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&contents)?;
        log::debug!("Loaded query settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(MAX_RESULTS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(value) => self.max_results = value,
                Err(e) => log::warn!("Ignoring {MAX_RESULTS_ENV}={raw:?}: {e}"),
            }
        }
        self
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !self.default_radius_meters.is_finite() || self.default_radius_meters < 0.0 {
            return Err(SettingsError::Invalid {
                field: "default_radius_meters",
                message: format!(
                    "expected a non-negative distance, got {}",
                    self.default_radius_meters
                ),
            });
        }
        Ok(())
    }
}
