//! # tstab Core Library
//!
//! Game-agnostic temporal stability rules driven by character-class traits.
//!
//! Every ticking entity gets a [`TemporalStabilityBehavior`] that:
//!
//! - **Resolves** its class into a frozen [`TraitSet`], retrying on a
//!   throttled clock until the class registry knows the class.
//! - **Evaluates** a fixed priority chain each tick, rewriting the host's
//!   stability velocity:
//!   1. Sheltered by stone: floor the velocity at a small gain underground.
//!   2. Agoraphobia: clamp the velocity to the surface loss outside enclosed rooms.
//!   3. Claustrophobia: amplify an existing loss underground.
//!
//! All host state arrives through the [`collaborators`] traits, so the chain
//! is deterministic under test. Alongside the stability rules the crate
//! carries the other class-trait adjustments a host needs: trade prices
//! ([`trade`]) and incoming damage ([`damage`]).
//!
//! ## Performance Contract
//!
//! - Resolved-empty entity tick: one branch, no collaborator calls.
//! - Evaluation: at most one sun sample, one room lookup and one stat blend.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod behavior;
pub mod collaborators;
pub mod config;
pub mod damage;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod rules;
pub mod trade;
pub mod traits;
pub mod types;

pub use behavior::{TemporalStabilityBehavior, TickContext, TickReport};
pub use collaborators::{ClassRegistry, EnvironmentSampler, LightChannel, RoomTopology, StatBlender};
pub use config::TstabConfig;
pub use error::{Result, TstabError};
pub use resolver::ResolutionOutcome;
pub use rules::{Evaluation, FiredRule, RuleEvaluator};
pub use traits::{StabilityTrait, TraitSet};
pub use types::*;
