//! Configuration for the tstab rule system.
//!
//! Maps directly to `tstab.toml`. Every section and field has a serde default
//! so a partial file (or an empty one) yields the stock tuning.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TstabConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Trait codes looked up in class definitions.
    #[serde(default)]
    pub traits: TraitCodesConfig,
    /// Rule thresholds and stat keys.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Trait resolution throttling.
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Diagnostic observer settings.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Trade-price adjustment.
    #[serde(default)]
    pub trade: TradeConfig,
}

impl TstabConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `TstabError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::TstabError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// World-level toggle for the whole temporal stability mechanic.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub log_json: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Trait codes as they appear in a class's trait list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitCodesConfig {
    /// Gains stability while underground.
    #[serde(default = "default_sheltered_code")]
    pub sheltered_by_stone: String,
    /// Loses stability under open sky.
    #[serde(default = "default_agoraphobia_code")]
    pub agoraphobia: String,
    /// Amplifies existing stability loss in caves.
    #[serde(default = "default_claustrophobia_code")]
    pub claustrophobia: String,
    /// Better trade prices.
    #[serde(default = "default_silver_tongue_code")]
    pub silver_tongue: String,
}

impl Default for TraitCodesConfig {
    fn default() -> Self {
        Self {
            sheltered_by_stone: default_sheltered_code(),
            agoraphobia: default_agoraphobia_code(),
            claustrophobia: default_claustrophobia_code(),
            silver_tongue: default_silver_tongue_code(),
        }
    }
}

/// Rule thresholds and the stat keys each rule blends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Stability velocity floor forced by ShelteredByStone (per second).
    #[serde(default = "default_sheltered_gain")]
    pub sheltered_gain_velocity: f64,
    /// Sunlight strictly below this counts as underground / fully shaded.
    #[serde(default = "default_cave_sunlight")]
    pub cave_sunlight_threshold: u8,
    /// Stat blended as `multiplier - 1` for the Agoraphobia surface loss.
    #[serde(default = "default_surface_stat")]
    pub surface_loss_stat: String,
    /// Stat blended as a pure multiplier for the Claustrophobia cave loss.
    #[serde(default = "default_cave_stat")]
    pub cave_loss_stat: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            sheltered_gain_velocity: 0.002,
            cave_sunlight_threshold: 5,
            surface_loss_stat: default_surface_stat(),
            cave_loss_stat: default_cave_stat(),
        }
    }
}

/// Trait resolution throttling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum simulated seconds between class lookups while pending.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: 1.0,
        }
    }
}

/// Diagnostic observer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Attach the tracing observer to every behavior.
    #[serde(default)]
    pub enabled: bool,
    /// Only every Nth qualifying evaluation is logged.
    #[serde(default = "default_log_every")]
    pub log_every_n_evaluations: u32,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_every_n_evaluations: 20,
        }
    }
}

/// Trade-price adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Fraction shaved off costs and added to gains for silver-tongued classes.
    #[serde(default = "default_silver_tongue_rate")]
    pub silver_tongue_rate: f32,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            silver_tongue_rate: 0.25,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_sheltered_code() -> String { "shelteredstone".to_string() }
fn default_agoraphobia_code() -> String { "agoraphobia".to_string() }
fn default_claustrophobia_code() -> String { "claustrophobicblessed".to_string() }
fn default_silver_tongue_code() -> String { "silvertongue".to_string() }
fn default_surface_stat() -> String { "surfaceStabilityLoss".to_string() }
fn default_cave_stat() -> String { "caveStabilityLoss".to_string() }
fn default_sheltered_gain() -> f64 { 0.002 }
fn default_cave_sunlight() -> u8 { 5 }
fn default_retry_interval() -> f64 { 1.0 }
fn default_log_every() -> u32 { 20 }
fn default_silver_tongue_rate() -> f32 { 0.25 }
