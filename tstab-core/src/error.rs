//! Error types for the tstab core library.

use thiserror::Error;

/// Top-level error type for all tstab operations.
///
/// Unresolved class lookups and missing rooms are *not* errors; they are
/// modelled as `Pending` and `None` respectively. Only genuine failures of an
/// injected collaborator, bad configuration or I/O end up here.
#[derive(Error, Debug)]
pub enum TstabError {
    /// An injected collaborator (stat blender, world sampler, registry)
    /// failed to produce a value.
    #[error("Collaborator '{service}' failed: {reason}")]
    Collaborator {
        /// Which collaborator failed.
        service: &'static str,
        /// Human-readable cause.
        reason: String,
    },

    /// A blended stat was requested that the entity does not carry.
    #[error("Unknown stat: {0}")]
    UnknownStat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A class catalog could not be parsed.
    #[error("Class catalog error: {0}")]
    Catalog(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TstabError {
    /// Shorthand for a collaborator failure.
    pub fn collaborator(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, TstabError>;
