//! Trait resolution: a `Pending → Resolved` state machine per entity.
//!
//! Class assignment may race with the tick loop when a session starts, so the
//! lookup is retried until it succeeds. Retries are throttled against the
//! simulated clock: while pending, at most one registry query happens per
//! `retry_interval_secs`. There is no retry limit.
//!
//! Once resolved the trait set is frozen for the rest of the session and the
//! registry is never consulted again for that entity.

use tracing::{debug, info, warn};

use crate::collaborators::ClassRegistry;
use crate::config::{ResolverConfig, TraitCodesConfig};
use crate::traits::TraitSet;
use crate::types::SimTime;

/// Result of polling the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Class not known yet; try again later.
    Pending,
    /// Terminal. May be the empty set.
    Resolved(TraitSet),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResolverState {
    Pending { last_attempt: SimTime },
    Resolved(TraitSet),
}

/// Per-entity trait resolver.
#[derive(Debug, Clone)]
pub struct TraitResolver {
    state: ResolverState,
    retry_interval_secs: f64,
    attempts: u32,
    reported_unknown_class: bool,
}

impl TraitResolver {
    /// Create a pending resolver whose throttle window starts at `started_at`.
    ///
    /// The first registry query happens once a full retry interval has
    /// elapsed after `started_at`.
    #[must_use]
    pub fn new(started_at: SimTime, config: &ResolverConfig) -> Self {
        Self {
            state: ResolverState::Pending {
                last_attempt: started_at,
            },
            retry_interval_secs: config.retry_interval_secs,
            attempts: 0,
            reported_unknown_class: false,
        }
    }

    /// Current outcome without attempting anything.
    #[must_use]
    pub fn outcome(&self) -> ResolutionOutcome {
        match self.state {
            ResolverState::Pending { .. } => ResolutionOutcome::Pending,
            ResolverState::Resolved(traits) => ResolutionOutcome::Resolved(traits),
        }
    }

    /// Whether resolution has completed.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ResolverState::Resolved(_))
    }

    /// Resolved traits, if any.
    #[must_use]
    pub fn traits(&self) -> Option<TraitSet> {
        match self.state {
            ResolverState::Resolved(traits) => Some(traits),
            ResolverState::Pending { .. } => None,
        }
    }

    /// Number of resolution attempts made so far, with or without a class.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether a registry query would be made at `now`.
    #[must_use]
    pub fn is_due(&self, now: SimTime) -> bool {
        match self.state {
            ResolverState::Pending { last_attempt } => now - last_attempt > self.retry_interval_secs,
            ResolverState::Resolved(_) => false,
        }
    }

    /// Attempt resolution if the throttle allows it.
    ///
    /// `class_code` is the class currently assigned to the entity, if any.
    pub fn poll(
        &mut self,
        now: SimTime,
        class_code: Option<&str>,
        registry: &dyn ClassRegistry,
        codes: &TraitCodesConfig,
    ) -> ResolutionOutcome {
        if !self.is_due(now) {
            return self.outcome();
        }

        self.state = ResolverState::Pending { last_attempt: now };
        self.attempts += 1;

        let Some(class_code) = class_code else {
            debug!(attempt = self.attempts, "No class assigned yet, deferring trait resolution");
            return ResolutionOutcome::Pending;
        };

        let Some(class_traits) = registry.class_traits(class_code) else {
            if !self.reported_unknown_class {
                self.reported_unknown_class = true;
                warn!(
                    class = class_code,
                    "Assigned class is not in the class registry; retrying until it appears"
                );
            }
            return ResolutionOutcome::Pending;
        };

        let traits = TraitSet::from_codes(&class_traits, codes);
        info!(
            class = class_code,
            traits = %traits,
            attempts = self.attempts,
            "Resolved stability traits"
        );
        self.state = ResolverState::Resolved(traits);
        ResolutionOutcome::Resolved(traits)
    }
}
