//! Run parameters.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default upper radius, in meters.
pub const DEFAULT_MAX_RADIUS: f64 = 50_000.0;
/// Default radius floor, in meters.
pub const DEFAULT_MIN_RADIUS: f64 = 100.0;

/// One packing run over one territory.
///
/// The run is a no-op unless `max_radius >= min_radius > 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Territory to cover
    pub territory_id: String,
    /// Radius of level 0, in meters
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,
    /// Smallest radius any level may use, in meters
    #[serde(default = "default_min_radius")]
    pub min_radius: f64,
    /// Search and termination tunables
    #[serde(default)]
    pub settings: PackingSettings,
}

/// Tunables of the radius search and the level loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingSettings {
    /// Finest radius step the search ever takes, in meters
    pub min_step: f64,
    /// Number of probes a wide search range is split into
    pub probes: u32,
    /// Multiplier applied when the search finds no smaller radius
    pub fallback_factor: f64,
    /// Hard cap on processed levels
    pub max_levels: u32,
}

impl Default for PackingSettings {
    fn default() -> Self {
        Self {
            min_step: 50.0,
            probes: 20,
            fallback_factor: 0.85,
            max_levels: 200,
        }
    }
}

impl GridConfig {
    /// Config with default settings.
    pub fn new(territory_id: impl Into<String>, max_radius: f64, min_radius: f64) -> Self {
        Self {
            territory_id: territory_id.into(),
            max_radius,
            min_radius,
            settings: PackingSettings::default(),
        }
    }

    /// Replaces the tunables.
    #[must_use]
    pub fn with_settings(mut self, settings: PackingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] for malformed text or a missing `territory_id`.
    ///
    /// ```
    /// use hexpack::GridConfig;
    ///
    /// let config = GridConfig::from_toml_str(r#"
    ///     territory_id = "NLD"
    ///     min_radius = 500.0
    /// "#).unwrap();
    /// assert_eq!(config.max_radius, 50_000.0);
    /// assert_eq!(config.settings.max_levels, 200);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Whether a run with this config can place anything.
    pub fn is_runnable(&self) -> bool {
        self.min_radius.is_finite()
            && self.max_radius.is_finite()
            && self.min_radius > 0.0
            && self.max_radius >= self.min_radius
    }
}

fn default_max_radius() -> f64 {
    DEFAULT_MAX_RADIUS
}

fn default_min_radius() -> f64 {
    DEFAULT_MIN_RADIUS
}
