//! Read-only diagnostics for the rule chain.
//!
//! Observers receive exactly what the evaluator consumed for a tick (via the
//! [`EvaluationTrace`](crate::rules::EvaluationTrace)) and can never touch
//! the velocity. The stock [`TracingObserver`] reproduces the agoraphobia
//! debugging output server operators rely on when a class "doesn't work".

use tracing::{debug, warn};

use crate::collaborators::{ClassRegistry, RoomTopology};
use crate::rules::Evaluation;
use crate::traits::{StabilityTrait, TraitSet};
use crate::types::{BlockPos, EntityId};

/// Everything an observer gets to see about one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationSnapshot<'a> {
    /// Entity that ticked.
    pub entity: EntityId,
    /// Block the entity stood in.
    pub position: BlockPos,
    /// Its resolved traits.
    pub traits: TraitSet,
    /// Result and inputs of the chain.
    pub evaluation: &'a Evaluation,
}

/// Receives a snapshot after each evaluation.
pub trait EvaluationObserver {
    /// Inspect one evaluation.
    fn observe(&mut self, snapshot: &EvaluationSnapshot<'_>);
}

/// Suspicious end states worth a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anomaly {
    /// Agoraphobic entity still losing stability inside an enclosed room.
    LosingInEnclosedRoom {
        /// Velocity after the tick.
        velocity: f64,
    },
    /// Stone-sheltered entity losing stability underground.
    LosingUnderground {
        /// Velocity after the tick.
        velocity: f64,
    },
}

/// Whether agoraphobia should apply given the room lookup.
#[must_use]
pub fn agoraphobia_exposed(room: Option<RoomTopology>) -> bool {
    !room.is_some_and(|r| r.is_enclosed())
}

/// Flag end states that contradict the trait descriptions.
///
/// Only inputs the evaluator actually sampled are considered; a room that
/// was never looked up cannot raise a room anomaly.
#[must_use]
pub fn anomalies(snapshot: &EvaluationSnapshot<'_>, cave_sunlight_threshold: u8) -> Vec<Anomaly> {
    let velocity = snapshot.evaluation.after;
    let mut found = Vec::new();
    if velocity >= 0.0 {
        return found;
    }

    let trace = &snapshot.evaluation.trace;
    let in_enclosed_room = matches!(trace.room, Some(Some(room)) if room.is_enclosed());
    if snapshot.traits.contains(StabilityTrait::Agoraphobia) && in_enclosed_room {
        found.push(Anomaly::LosingInEnclosedRoom { velocity });
    }

    if snapshot.traits.contains(StabilityTrait::ShelteredByStone)
        && trace.sunlight.is_some_and(|sun| sun < cave_sunlight_threshold)
    {
        found.push(Anomaly::LosingUnderground { velocity });
    }

    found
}

/// Logs periodic agoraphobia state through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    every_n: u32,
    seen: u32,
    cave_sunlight_threshold: u8,
}

impl TracingObserver {
    /// Log every `every_n`-th agoraphobic evaluation (0 is treated as 1).
    #[must_use]
    pub fn new(every_n: u32, cave_sunlight_threshold: u8) -> Self {
        Self {
            every_n: every_n.max(1),
            seen: 0,
            cave_sunlight_threshold,
        }
    }

    fn log(&self, snapshot: &EvaluationSnapshot<'_>) {
        let eval = snapshot.evaluation;
        let trace = &eval.trace;

        debug!(
            entity = %snapshot.entity,
            position = %snapshot.position,
            traits = %snapshot.traits,
            sunlight = ?trace.sunlight,
            velocity_before = eval.before,
            velocity_after = eval.after,
            surface_loss = ?trace.surface_loss,
            fired = ?eval.fired,
            "Agoraphobia state"
        );

        match trace.room {
            Some(Some(room)) => debug!(
                exits = room.exit_count,
                skylight = room.skylight_count,
                non_skylight = room.non_skylight_count,
                should_be_active = agoraphobia_exposed(Some(room)),
                "Room topology"
            ),
            Some(None) => debug!(should_be_active = true, "Not in a room"),
            None => debug!("Room not sampled this tick"),
        }

        if snapshot.traits.contains(StabilityTrait::ShelteredByStone)
            && trace.sunlight.is_some_and(|sun| sun < self.cave_sunlight_threshold)
        {
            debug!("Sheltered by stone is active and takes priority over agoraphobia");
        }

        for anomaly in anomalies(snapshot, self.cave_sunlight_threshold) {
            match anomaly {
                Anomaly::LosingInEnclosedRoom { velocity } => {
                    warn!(entity = %snapshot.entity, velocity, "Losing stability in an enclosed room");
                }
                Anomaly::LosingUnderground { velocity } => {
                    warn!(entity = %snapshot.entity, velocity, "Losing stability underground");
                }
            }
        }
    }
}

impl EvaluationObserver for TracingObserver {
    fn observe(&mut self, snapshot: &EvaluationSnapshot<'_>) {
        if !snapshot.traits.contains(StabilityTrait::Agoraphobia) {
            return;
        }
        self.seen += 1;
        if self.seen < self.every_n {
            return;
        }
        self.seen = 0;
        self.log(snapshot);
    }
}

// ---------------------------------------------------------------------------
// Class validation
// ---------------------------------------------------------------------------

/// Why an entity's class cannot be resolved right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassIssue {
    /// The entity has no class assigned.
    Unassigned,
    /// The class code is not in the registry (disabled or removed class).
    Unknown(String),
}

/// Check that an entity's class code is resolvable.
///
/// # Errors
/// Returns the [`ClassIssue`] preventing resolution.
pub fn validate_class_code(
    class_code: Option<&str>,
    registry: &dyn ClassRegistry,
) -> Result<(), ClassIssue> {
    match class_code {
        None => Err(ClassIssue::Unassigned),
        Some(code) if registry.class_traits(code).is_none() => {
            Err(ClassIssue::Unknown(code.to_string()))
        }
        Some(_) => Ok(()),
    }
}
