//! Rule evaluation: the priority chain that rewrites stability velocity.
//!
//! Three rules, one per trait, are tried in a fixed order and the first whose
//! guard matches produces the final velocity for the tick:
//!
//! | Priority | Rule              | Guard                                        | Effect                               |
//! |----------|-------------------|----------------------------------------------|--------------------------------------|
//! | 1        | Sheltered by stone| trait, `sun < threshold`                     | `v = max(v, gain)`                   |
//! | 2        | Agoraphobia       | trait, not in an enclosed room               | `v = min(v, surfaceLoss - 1)`        |
//! | 3        | Claustrophobia    | trait, `sun < threshold`, `v < 0`            | `v = v * caveLoss`                   |
//!
//! At most one rule fires. If none matches, the velocity produced by the
//! host's own (non-trait) modifiers stands.
//!
//! The velocity is only written after every read for the tick succeeded, so
//! a collaborator failure leaves it untouched.

use tracing::trace;

use crate::collaborators::{EnvironmentSampler, LightChannel, RoomTopology, StatBlender};
use crate::config::RulesConfig;
use crate::error::Result;
use crate::traits::{StabilityTrait, TraitSet};
use crate::types::BlockPos;

/// Which rule produced the tick's velocity, with the numbers it used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FiredRule {
    /// Underground with the sheltered trait.
    ShelteredByStone {
        /// The existing velocity already exceeded the gain and was kept.
        kept_existing_gain: bool,
    },
    /// Exposed with the agoraphobia trait.
    Agoraphobia {
        /// `surfaceStabilityLoss - 1`.
        surface_loss: f64,
        /// The existing velocity was already worse and was kept.
        kept_existing_loss: bool,
    },
    /// Underground, already losing, with the claustrophobia trait.
    Claustrophobia {
        /// `caveStabilityLoss` multiplier.
        cave_loss: f32,
    },
}

impl FiredRule {
    /// The trait whose rule fired.
    #[must_use]
    pub fn stability_trait(&self) -> StabilityTrait {
        match self {
            Self::ShelteredByStone { .. } => StabilityTrait::ShelteredByStone,
            Self::Agoraphobia { .. } => StabilityTrait::Agoraphobia,
            Self::Claustrophobia { .. } => StabilityTrait::Claustrophobia,
        }
    }
}

/// Everything the evaluator read while deciding. Fields stay `None` when the
/// chain never needed them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvaluationTrace {
    /// Sky light at the entity's block.
    pub sunlight: Option<u8>,
    /// Room lookup result; `Some(None)` means "looked, open air".
    pub room: Option<Option<RoomTopology>>,
    /// Computed surface loss delta.
    pub surface_loss: Option<f64>,
    /// Cave loss multiplier.
    pub cave_loss: Option<f32>,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Velocity on entry.
    pub before: f64,
    /// Velocity on exit.
    pub after: f64,
    /// Rule that fired, if any.
    pub fired: Option<FiredRule>,
    /// Inputs the chain consumed.
    pub trace: EvaluationTrace,
}

impl Evaluation {
    /// Whether the velocity was overwritten with a different value.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.before.to_bits() != self.after.to_bits()
    }
}

/// Applies the trait rule chain.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    config: RulesConfig,
}

impl RuleEvaluator {
    /// Create an evaluator with the given thresholds and stat keys.
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Run the chain for one tick, overwriting `velocity` if a rule fires.
    ///
    /// # Errors
    /// Propagates collaborator failures. `velocity` is left untouched in
    /// that case.
    pub fn evaluate(
        &self,
        traits: TraitSet,
        velocity: &mut f64,
        pos: BlockPos,
        environment: &dyn EnvironmentSampler,
        stats: &dyn StatBlender,
    ) -> Result<Evaluation> {
        let before = *velocity;
        let mut trace = EvaluationTrace::default();
        let fired = self.first_match(traits, before, pos, environment, stats, &mut trace)?;

        let after = match fired {
            Some((rule, value)) => {
                trace!(rule = ?rule, before, after = value, %pos, "Stability rule fired");
                *velocity = value;
                value
            }
            None => before,
        };

        Ok(Evaluation {
            before,
            after,
            fired: fired.map(|(rule, _)| rule),
            trace,
        })
    }

    fn first_match(
        &self,
        traits: TraitSet,
        velocity: f64,
        pos: BlockPos,
        environment: &dyn EnvironmentSampler,
        stats: &dyn StatBlender,
        trace: &mut EvaluationTrace,
    ) -> Result<Option<(FiredRule, f64)>> {
        let gain = self.config.sheltered_gain_velocity;

        if traits.contains(StabilityTrait::ShelteredByStone) && self.underground(pos, environment, trace)? {
            let kept = velocity > gain;
            let value = if kept { velocity } else { gain };
            return Ok(Some((FiredRule::ShelteredByStone { kept_existing_gain: kept }, value)));
        }

        if traits.contains(StabilityTrait::Agoraphobia) {
            let room = environment.room_at(pos)?;
            trace.room = Some(room);

            let sheltered = room.is_some_and(|r| r.is_enclosed());
            if !sheltered {
                let surface_loss = f64::from(stats.blended(&self.config.surface_loss_stat)?) - 1.0;
                trace.surface_loss = Some(surface_loss);

                let kept = velocity < surface_loss;
                let value = if kept { velocity } else { surface_loss };
                return Ok(Some((
                    FiredRule::Agoraphobia {
                        surface_loss,
                        kept_existing_loss: kept,
                    },
                    value,
                )));
            }
        }

        if traits.contains(StabilityTrait::Claustrophobia)
            && self.underground(pos, environment, trace)?
            && velocity < 0.0
        {
            let cave_loss = stats.blended(&self.config.cave_loss_stat)?;
            trace.cave_loss = Some(cave_loss);
            return Ok(Some((
                FiredRule::Claustrophobia { cave_loss },
                velocity * f64::from(cave_loss),
            )));
        }

        Ok(None)
    }

    /// Sky light below the cave threshold. Sampled at most once per tick.
    fn underground(
        &self,
        pos: BlockPos,
        environment: &dyn EnvironmentSampler,
        trace: &mut EvaluationTrace,
    ) -> Result<bool> {
        let sun = match trace.sunlight {
            Some(sun) => sun,
            None => {
                let sun = environment.light_level(pos, LightChannel::Sun)?;
                trace.sunlight = Some(sun);
                sun
            }
        };
        Ok(sun < self.config.cave_sunlight_threshold)
    }
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}
