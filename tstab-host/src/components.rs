//! ECS-style components for the temporal stability system.
//!
//! These components are attached to ticking entities (usually players) to
//! give them trait-driven stability behavior.

use tstab_core::behavior::TemporalStabilityBehavior;
use tstab_core::damage::DamageModifiers;
use tstab_core::diagnostics::TracingObserver;
use tstab_core::types::{BlockPos, EntityId};
use tstab_core::TstabConfig;

use crate::bridge::{EntityRegistry, StatSheet};

/// The primary stability component.
///
/// Owns the per-entity behavior together with the host state it reads each
/// tick. `velocity` is written by the host's own modifiers first and then
/// rewritten by the trait rules.
#[derive(Debug)]
pub struct StabilityComponent {
    /// Stable id of the entity.
    pub entity: EntityId,
    /// The entity is a player character.
    pub is_player: bool,
    /// The player's client is connected.
    pub connected: bool,
    /// Excluded from stability ticking regardless of the other gates.
    pub exempt: bool,
    /// Assigned class, once the player has picked one.
    pub class_code: Option<String>,
    /// Current block.
    pub position: BlockPos,
    /// Stability change per simulated second.
    pub velocity: f64,
    /// The entity's stats.
    pub stats: StatSheet,
    /// Damage traits.
    pub damage: DamageModifiers,
    /// The entity is burning.
    pub on_fire: bool,
    /// Trait resolution and rule evaluation.
    pub behavior: TemporalStabilityBehavior,
}

impl StabilityComponent {
    /// Create a component for a freshly spawned player.
    ///
    /// Attaches the diagnostic observer when `config.diagnostics.enabled`.
    #[must_use]
    pub fn new_player(entity: EntityId, config: &TstabConfig) -> Self {
        let mut behavior = TemporalStabilityBehavior::new(entity, config);
        if config.diagnostics.enabled {
            behavior = behavior.with_observer(Box::new(TracingObserver::new(
                config.diagnostics.log_every_n_evaluations,
                config.rules.cave_sunlight_threshold,
            )));
        }

        Self {
            entity,
            is_player: true,
            connected: true,
            exempt: false,
            class_code: None,
            position: BlockPos::default(),
            velocity: 0.0,
            stats: StatSheet::with_defaults(),
            damage: DamageModifiers::NONE,
            on_fire: false,
            behavior,
        }
    }

    /// Create a player component keyed by the host's own entity id.
    ///
    /// A host id seen before maps back to the same `EntityId`, so a player
    /// that respawns keeps its identity in logs and metrics.
    #[must_use]
    pub fn spawn_player(
        host_id: u64,
        registry: &mut EntityRegistry,
        config: &TstabConfig,
    ) -> Self {
        Self::new_player(registry.entity(host_id), config)
    }

    /// Assign a class.
    #[must_use]
    pub fn with_class(mut self, class_code: impl Into<String>) -> Self {
        self.class_code = Some(class_code.into());
        self
    }

    /// Move the entity to a world-space position.
    pub fn move_to(&mut self, x: f64, y: f64, z: f64) {
        self.position = BlockPos::from_entity_pos(x, y, z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostConfig, HostProfile};

    #[test]
    fn new_player_starts_unresolved() {
        let c = StabilityComponent::new_player(EntityId::new(), &TstabConfig::default())
            .with_class("miner");
        assert!(c.is_player);
        assert!(c.behavior.traits().is_none());
        assert_eq!(c.class_code.as_deref(), Some("miner"));
        assert_eq!(c.behavior.entity(), c.entity);
    }

    #[test]
    fn spawn_reuses_entity_for_known_host_id() {
        let config = TstabConfig::default();
        let mut registry = EntityRegistry::new();
        let first = StabilityComponent::spawn_player(42, &mut registry, &config);
        let again = StabilityComponent::spawn_player(42, &mut registry, &config);
        let other = StabilityComponent::spawn_player(43, &mut registry, &config);

        assert_eq!(first.entity, again.entity);
        assert_ne!(first.entity, other.entity);
        assert_eq!(registry.host_id(&first.entity), Some(42));
        assert_eq!(registry.count(), 2);
        assert!(!first.exempt);
    }

    #[test]
    fn observer_attached_only_with_diagnostics() {
        let plain = StabilityComponent::new_player(EntityId::new(), &TstabConfig::default());
        assert!(format!("{:?}", plain.behavior).contains("observed: false"));

        let debug = HostConfig::for_profile(HostProfile::Debug);
        let observed = StabilityComponent::new_player(EntityId::new(), &debug.core);
        assert!(format!("{:?}", observed.behavior).contains("observed: true"));
    }

    #[test]
    fn move_floors_into_blocks() {
        let mut c = StabilityComponent::new_player(EntityId::new(), &TstabConfig::default());
        c.move_to(1.7, -0.2, 3.0);
        assert_eq!(c.position, BlockPos::new(1, -1, 3));
    }
}
