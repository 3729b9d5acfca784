use std::path::Path;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ConfigError;
use crate::services::shading::MetroEntry;

fn default_port() -> u16 { 8080 }
fn default_elevation_enabled() -> bool { false }
fn default_elevation_base_url() -> String { "https://api.open-meteo.com".to_string() }
fn default_timeout_s() -> u64 { 5 }
fn default_sample_offset_m() -> f64 { 100.0 }

/// Service configuration, read from `config.json`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub elevation: ElevationConfig,
    /// Replaces the built-in metro shading table when present
    #[serde(default)]
    pub metro_table: Option<Vec<MetroEntry>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ElevationConfig {
    #[serde(default = "default_elevation_enabled")]
    pub enabled: bool,
    #[serde(default = "default_elevation_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    /// Distance (m) from the roof to each neighbouring elevation sample
    #[serde(default = "default_sample_offset_m")]
    pub sample_offset_m: f64,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            enabled: default_elevation_enabled(),
            base_url: default_elevation_base_url(),
            timeout_s: default_timeout_s(),
            sample_offset_m: default_sample_offset_m(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Deserializes and validates a `config.json` document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        let offset = self.elevation.sample_offset_m;
        if !offset.is_finite() || offset <= 0.0 {
            return invalid(format!("elevation.sample_offset_m must be positive, got {offset}"));
        }
        if self.elevation.timeout_s == 0 {
            return invalid("elevation.timeout_s must be at least 1".to_string());
        }
        for entry in self.metro_table.iter().flatten() {
            if !(0.0..=1.0).contains(&entry.shading_factor) {
                return invalid(format!(
                    "metro_table entry {} has shading_factor {} outside [0, 1]",
                    entry.name, entry.shading_factor
                ));
            }
        }
        Ok(())
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("{} not found, using default service configuration", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

// ─── Financial constants ─────────────────────────────────────────────────────

/// Tunable financial assumptions of the estimate engine.
///
/// # Environment Variables
///
/// | Variable | Default | Field |
/// |---|---|---|
/// | `DEFAULT_COST_PER_WATT` | 3.00 | `cost_per_watt` |
/// | `DEFAULT_LOSSES_PCT` | 14 | `losses_pct` |
/// | `DEFAULT_DEGRADATION_PCT` | 0.5 | `degradation_pct` |
/// | `OANDM_PER_KW_YEAR` | 22 | `oandm_per_kw_year` |
/// | `RATE_INCREASE_PCT` | 2.5 | `rate_increase_pct` |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialConfig {
    /// Base installed cost (USD/W) before the regional multiplier
    pub cost_per_watt: f64,
    /// System losses (%)
    pub losses_pct: f64,
    /// Annual panel degradation (%/yr)
    pub degradation_pct: f64,
    /// Operations & maintenance (USD per kW per year)
    pub oandm_per_kw_year: f64,
    /// Annual electricity rate inflation (%/yr)
    pub rate_increase_pct: f64,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            cost_per_watt: 3.00,
            losses_pct: 14.0,
            degradation_pct: 0.5,
            oandm_per_kw_year: 22.0,
            rate_increase_pct: 2.5,
        }
    }
}

impl FinancialConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset or blank
    /// variables take their defaults; anything else must parse as a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &'static str, default: f64| -> Result<f64, ConfigError> {
            match lookup(name) {
                Some(raw) if !raw.trim().is_empty() => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidEnv { name, value: raw }),
                _ => Ok(default),
            }
        };

        let config = Self {
            cost_per_watt: read("DEFAULT_COST_PER_WATT", defaults.cost_per_watt)?,
            losses_pct: read("DEFAULT_LOSSES_PCT", defaults.losses_pct)?,
            degradation_pct: read("DEFAULT_DEGRADATION_PCT", defaults.degradation_pct)?,
            oandm_per_kw_year: read("OANDM_PER_KW_YEAR", defaults.oandm_per_kw_year)?,
            rate_increase_pct: read("RATE_INCREASE_PCT", defaults.rate_increase_pct)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        let fields = [
            ("cost_per_watt", self.cost_per_watt),
            ("losses_pct", self.losses_pct),
            ("degradation_pct", self.degradation_pct),
            ("oandm_per_kw_year", self.oandm_per_kw_year),
            ("rate_increase_pct", self.rate_increase_pct),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(format!("{name} must be finite, got {value}"));
        }
        if self.cost_per_watt <= 0.0 {
            return invalid(format!("cost_per_watt must be positive, got {}", self.cost_per_watt));
        }
        if !(0.0..100.0).contains(&self.losses_pct) {
            return invalid(format!("losses_pct must be in [0, 100), got {}", self.losses_pct));
        }
        if !(0.0..100.0).contains(&self.degradation_pct) {
            return invalid(format!(
                "degradation_pct must be in [0, 100), got {}",
                self.degradation_pct
            ));
        }
        if self.oandm_per_kw_year < 0.0 {
            return invalid(format!(
                "oandm_per_kw_year must not be negative, got {}",
                self.oandm_per_kw_year
            ));
        }
        Ok(())
    }
}
