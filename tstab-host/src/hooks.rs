//! Integration hooks for the host's trade and combat systems.
//!
//! The stability tick runs from [`crate::systems`]; the class traits that act
//! on other game events are applied through these hooks, called by the host
//! at the point the event is resolved.

use tracing::{debug, warn};

use tstab_core::collaborators::ClassRegistry;
use tstab_core::damage::{DamageCause, DamageEvent, DamageKind, DamageOutcome};
use tstab_core::trade::{self, TradeAdjuster, TradeTotals};
use tstab_core::TstabConfig;

use crate::components::StabilityComponent;

/// Settle a trade for `trader`, applying the silver tongue adjustment after
/// `compute` has produced the raw totals.
pub fn on_trade<F>(
    trader: &StabilityComponent,
    classes: &dyn ClassRegistry,
    config: &TstabConfig,
    compute: F,
) -> TradeTotals
where
    F: FnOnce() -> TradeTotals,
{
    let silver = trade::has_silver_tongue(trader.class_code.as_deref(), classes, &config.traits);
    let totals = TradeAdjuster::new(&config.trade).settle(silver, compute);
    if silver {
        debug!(entity = %trader.entity, cost = totals.cost, gain = totals.gain, "Silver tongue trade");
    }
    totals
}

/// Who dealt the damage, as the host sees it.
#[derive(Debug, Clone, Copy)]
pub enum Attacker<'a> {
    /// No causing entity.
    None,
    /// A player with a stability component.
    Player(&'a StabilityComponent),
    /// A creature.
    Creature {
        /// Carries the `isMechanical` attribute.
        mechanical: bool,
    },
}

/// Modify incoming damage on `victim` by its damage traits.
///
/// Extinguishes the victim when dragonskin says so. A stat lookup failure is
/// logged and the raw damage applies unchanged.
pub fn on_receive_damage(
    victim: &mut StabilityComponent,
    kind: DamageKind,
    attacker: Attacker<'_>,
    amount: f32,
) -> DamageOutcome {
    let unmodified = DamageOutcome {
        amount,
        extinguish: false,
    };
    if !victim.damage.any() {
        return unmodified;
    }

    let cause = match attacker {
        Attacker::None => DamageCause::Environment,
        Attacker::Player(player) => DamageCause::Player(&player.stats),
        Attacker::Creature { mechanical } => DamageCause::Creature { mechanical },
    };
    let event = DamageEvent { kind, cause, amount };

    match victim.damage.apply(&event, &victim.stats, victim.is_player) {
        Ok(outcome) => {
            if outcome.extinguish {
                victim.on_fire = false;
            }
            outcome
        }
        Err(error) => {
            warn!(entity = %victim.entity, %error, "Damage modifiers failed, applying raw damage");
            unmodified
        }
    }
}
