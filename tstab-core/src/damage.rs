//! Incoming-damage modifiers granted by class traits.
//!
//! Applied in a fixed order when an entity is about to take damage:
//! dragonskin (fire resistance, runs before anything else), then dread, then
//! fanatic. Each step multiplies the running amount by a blended stat.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collaborators::StatBlender;
use crate::error::Result;

/// Victim stat blended by dragonskin.
pub const FIRE_DAMAGE_STAT: &str = "fireDamage";
/// Attacker stat blended by dread.
pub const RUSTED_DAMAGE_STAT: &str = "rustedDamage";
/// Victim stat blended by fanatic.
pub const MECHANICAL_DAMAGE_STAT: &str = "damageFromMechanicals";

/// Kind of incoming damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    /// Burning or fire sources.
    Fire,
    /// Anything else.
    Other,
}

/// Who caused the damage.
#[derive(Clone, Copy)]
pub enum DamageCause<'a> {
    /// Environmental damage with no causing entity.
    Environment,
    /// Another player, with access to their stats.
    Player(&'a dyn StatBlender),
    /// A non-player entity.
    Creature {
        /// The creature is flagged as mechanical.
        mechanical: bool,
    },
}

impl std::fmt::Debug for DamageCause<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => f.write_str("Environment"),
            Self::Player(_) => f.write_str("Player"),
            Self::Creature { mechanical } => {
                f.debug_struct("Creature").field("mechanical", mechanical).finish()
            }
        }
    }
}

/// One incoming hit.
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent<'a> {
    /// Damage type.
    pub kind: DamageKind,
    /// Source of the hit.
    pub cause: DamageCause<'a>,
    /// Raw amount before modifiers.
    pub amount: f32,
}

/// Modified damage plus side effects the host must apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Amount after all modifiers.
    pub amount: f32,
    /// Put out any fire on the victim.
    pub extinguish: bool,
}

/// Which damage traits an entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageModifiers {
    /// Fire resistance that also puts the wearer out.
    #[serde(default)]
    pub dragonskin: bool,
    /// Hits from players scale with the attacker's `rustedDamage`.
    #[serde(default)]
    pub dread: bool,
    /// Hits from mechanical creatures scale with `damageFromMechanicals`.
    #[serde(default)]
    pub fanatic: bool,
}

impl DamageModifiers {
    /// No damage traits.
    pub const NONE: Self = Self {
        dragonskin: false,
        dread: false,
        fanatic: false,
    };

    /// Whether any modifier is active.
    #[must_use]
    pub fn any(&self) -> bool {
        self.dragonskin || self.dread || self.fanatic
    }

    /// Apply every active modifier to `event`.
    ///
    /// `victim_is_player` gates fanatic, which only protects players.
    ///
    /// # Errors
    /// Propagates stat lookup failures from the victim or attacker.
    pub fn apply(
        &self,
        event: &DamageEvent<'_>,
        victim: &dyn StatBlender,
        victim_is_player: bool,
    ) -> Result<DamageOutcome> {
        let mut outcome = DamageOutcome {
            amount: event.amount,
            extinguish: false,
        };

        if self.dragonskin {
            let resist = victim.blended(FIRE_DAMAGE_STAT)?;
            if resist < 1.0 {
                outcome.extinguish = true;
                if event.kind == DamageKind::Fire {
                    outcome.amount *= resist;
                }
            }
        }

        if self.dread {
            if let DamageCause::Player(attacker) = event.cause {
                outcome.amount *= attacker.blended(RUSTED_DAMAGE_STAT)?;
            }
        }

        if self.fanatic && victim_is_player {
            if let DamageCause::Creature { mechanical: true } = event.cause {
                outcome.amount *= victim.blended(MECHANICAL_DAMAGE_STAT)?;
            }
        }

        trace!(
            raw = event.amount,
            modified = outcome.amount,
            extinguish = outcome.extinguish,
            cause = ?event.cause,
            "Damage modifiers applied"
        );
        Ok(outcome)
    }
}
