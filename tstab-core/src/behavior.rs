//! Per-entity temporal stability behavior: the tick entry point.
//!
//! One [`TemporalStabilityBehavior`] lives alongside each ticking entity.
//! Every host tick:
//!
//! 1. If there are resolved traits, the rule chain runs against the
//!    velocity the host computed from its own modifiers this tick.
//! 2. While traits are unresolved, the simulated clock advances and the
//!    resolver is polled (throttled to its retry interval).
//!
//! An entity that resolves to the empty trait set costs one boolean check
//! per tick for the rest of the session.

use tracing::trace;

use crate::collaborators::{ClassRegistry, EnvironmentSampler, StatBlender};
use crate::config::{TraitCodesConfig, TstabConfig};
use crate::diagnostics::{EvaluationObserver, EvaluationSnapshot};
use crate::error::Result;
use crate::resolver::{ResolutionOutcome, TraitResolver};
use crate::rules::{Evaluation, RuleEvaluator};
use crate::traits::TraitSet;
use crate::types::{BlockPos, EntityId, SimTime};

/// Borrowed host state for one entity's tick.
pub struct TickContext<'a> {
    /// Class currently assigned to the entity, if any.
    pub class_code: Option<&'a str>,
    /// Block the entity occupies.
    pub position: BlockPos,
    /// Host-owned stability velocity (per simulated second).
    pub velocity: &'a mut f64,
    /// Class → trait codes lookup.
    pub classes: &'a dyn ClassRegistry,
    /// Light and room queries.
    pub environment: &'a dyn EnvironmentSampler,
    /// The entity's blended stats.
    pub stats: &'a dyn StatBlender,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// The resolver made an attempt this tick. An attempt with no class
    /// assigned does not reach the class registry.
    pub resolution_attempted: bool,
    /// Resolution completed this tick.
    pub newly_resolved: Option<TraitSet>,
    /// The rule chain ran this tick.
    pub evaluation: Option<Evaluation>,
}

/// Stability state machine for a single entity.
pub struct TemporalStabilityBehavior {
    entity: EntityId,
    clock: SimTime,
    resolver: TraitResolver,
    evaluator: RuleEvaluator,
    codes: TraitCodesConfig,
    observer: Option<Box<dyn EvaluationObserver>>,
}

impl TemporalStabilityBehavior {
    /// Create the behavior on the entity's first tick.
    #[must_use]
    pub fn new(entity: EntityId, config: &TstabConfig) -> Self {
        Self {
            entity,
            clock: SimTime::ZERO,
            resolver: TraitResolver::new(SimTime::ZERO, &config.resolver),
            evaluator: RuleEvaluator::new(config.rules.clone()),
            codes: config.traits.clone(),
            observer: None,
        }
    }

    /// Attach a read-only observer that sees every evaluation.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn EvaluationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The entity this behavior belongs to.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Resolution state.
    #[must_use]
    pub fn outcome(&self) -> ResolutionOutcome {
        self.resolver.outcome()
    }

    /// Resolved traits, if resolution has completed.
    #[must_use]
    pub fn traits(&self) -> Option<TraitSet> {
        self.resolver.traits()
    }

    /// Simulated seconds accumulated while waiting for resolution.
    #[must_use]
    pub fn clock(&self) -> SimTime {
        self.clock
    }

    /// Advance one host tick.
    ///
    /// # Errors
    /// Propagates collaborator failures from the rule chain. The velocity is
    /// unchanged when an error is returned; the host should skip this
    /// entity for the tick and carry on with the others.
    pub fn on_tick(&mut self, delta_seconds: f32, ctx: &mut TickContext<'_>) -> Result<TickReport> {
        let mut report = TickReport::default();

        if let Some(traits) = self.resolver.traits() {
            if !traits.is_empty() {
                report.evaluation = Some(self.evaluate(traits, ctx)?);
            }
            return Ok(report);
        }

        self.clock = self.clock.advanced(delta_seconds);
        let attempts_before = self.resolver.attempts();
        let outcome = self.resolver.poll(self.clock, ctx.class_code, ctx.classes, &self.codes);
        report.resolution_attempted = self.resolver.attempts() > attempts_before;

        if let ResolutionOutcome::Resolved(traits) = outcome {
            report.newly_resolved = Some(traits);
            trace!(entity = %self.entity, %traits, clock = %self.clock, "Trait resolution complete");
        }

        Ok(report)
    }

    fn evaluate(&mut self, traits: TraitSet, ctx: &mut TickContext<'_>) -> Result<Evaluation> {
        let evaluation =
            self.evaluator
                .evaluate(traits, ctx.velocity, ctx.position, ctx.environment, ctx.stats)?;

        if let Some(observer) = self.observer.as_mut() {
            observer.observe(&EvaluationSnapshot {
                entity: self.entity,
                position: ctx.position,
                traits,
                evaluation: &evaluation,
            });
        }

        Ok(evaluation)
    }
}

impl std::fmt::Debug for TemporalStabilityBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalStabilityBehavior")
            .field("entity", &self.entity)
            .field("clock", &self.clock)
            .field("outcome", &self.resolver.outcome())
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
