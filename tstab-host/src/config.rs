//! Host-specific configuration for the temporal stability system.
//!
//! This module provides deployment profiles and host-side gates on top of
//! the base `tstab_core::config::TstabConfig`, plus the `tracing` subscriber
//! setup every host binary calls at startup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use tstab_core::config::{GeneralConfig, TstabConfig};
use tstab_core::error::{Result, TstabError};

// ---------------------------------------------------------------------------
// Deployment Profiles
// ---------------------------------------------------------------------------

/// How the host is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostProfile {
    /// Multiplayer server. Only connected players tick.
    #[default]
    Dedicated,
    /// Local world. The single player ticks even while the client reconnects.
    Singleplayer,
    /// Dedicated settings with the diagnostic observer attached and verbose logs.
    Debug,
}

impl HostProfile {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Dedicated => "Dedicated: connected players only",
            Self::Singleplayer => "Singleplayer: local player, connection not required",
            Self::Debug => "Debug: dedicated gates plus agoraphobia diagnostics",
        }
    }
}

// ---------------------------------------------------------------------------
// Host Configuration
// ---------------------------------------------------------------------------

/// Extended configuration for the host integration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Base rule system configuration.
    #[serde(default)]
    pub core: TstabConfig,
    /// Deployment profile the gates below were derived from.
    #[serde(default)]
    pub profile: HostProfile,
    /// Only entities flagged as players carry the behavior.
    #[serde(default = "default_true")]
    pub players_only: bool,
    /// Skip players whose client is not connected.
    #[serde(default = "default_true")]
    pub require_connected: bool,
    /// Per-frame time budget for ticking every behavior (milliseconds).
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: f64,
}

impl HostConfig {
    /// Create a config tuned for the given profile.
    #[must_use]
    pub fn for_profile(profile: HostProfile) -> Self {
        let mut config = Self::default();
        config.profile = profile;

        match profile {
            HostProfile::Dedicated => {
                // Default values are tuned for Dedicated
            }
            HostProfile::Singleplayer => {
                config.require_connected = false;
                config.frame_budget_ms = 1.0;
            }
            HostProfile::Debug => {
                config.core.general.log_level = "debug".to_string();
                config.core.diagnostics.enabled = true;
                config.frame_budget_ms = 2.0;
            }
        }

        config
    }

    /// Load from a TOML string.
    ///
    /// # Errors
    /// Returns `TstabError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| TstabError::Config(e.to_string()))
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            core: TstabConfig::default(),
            profile: HostProfile::Dedicated,
            players_only: true,
            require_connected: true,
            frame_budget_ms: 0.5,
        }
    }
}

fn default_true() -> bool { true }
fn default_frame_budget_ms() -> f64 { 0.5 }

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `general.log_level` applies to the
/// tstab crates. `general.log_json` switches to the JSON formatter.
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(general: &GeneralConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,tstab_core={level},tstab_host={level}",
            level = general.log_level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if general.log_json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_dedicated() {
        let config = HostConfig::default();
        assert_eq!(config.profile, HostProfile::Dedicated);
        assert!(config.players_only);
        assert!(config.require_connected);
        assert!(!config.core.diagnostics.enabled);
    }

    #[test]
    fn singleplayer_drops_connection_gate() {
        let config = HostConfig::for_profile(HostProfile::Singleplayer);
        assert!(!config.require_connected);
        assert!(config.players_only);
    }

    #[test]
    fn debug_profile_enables_diagnostics() {
        let config = HostConfig::for_profile(HostProfile::Debug);
        assert!(config.core.diagnostics.enabled);
        assert_eq!(config.core.general.log_level, "debug");
        assert!(!config.profile.description().is_empty());
    }

    #[test]
    fn nested_toml_sections() {
        let config = HostConfig::from_toml(
            r#"
            profile = "singleplayer"
            require_connected = false

            [core.general]
            enabled = false

            [core.rules]
            cave_sunlight_threshold = 8
            "#,
        )
        .expect("parse");
        assert_eq!(config.profile, HostProfile::Singleplayer);
        assert!(!config.require_connected);
        assert!(config.players_only);
        assert!(!config.core.general.enabled);
        assert_eq!(config.core.rules.cave_sunlight_threshold, 8);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = HostConfig::from_toml("profile = 3").unwrap_err();
        assert!(matches!(err, TstabError::Config(_)));
    }

    #[test]
    fn init_logging_is_idempotent() {
        let general = GeneralConfig::default();
        let first = init_logging(&general);
        let second = init_logging(&general);
        assert!(!(first && second));
    }

    #[test]
    fn json_logging_parses_and_installs_at_most_once() {
        let config = HostConfig::from_toml(
            r#"
            [core.general]
            log_json = true
            "#,
        )
        .expect("parse");
        assert!(config.core.general.log_json);
        assert!(!HostConfig::default().core.general.log_json);

        let first = init_logging(&config.core.general);
        let second = init_logging(&config.core.general);
        assert!(!second || !first);
    }
}
