//! Bridge module: reference implementations of the core collaborator traits.
//!
//! A real game plugs its own stat system, world and class list into
//! `tstab_core::collaborators`. The types here are the in-process versions
//! used by the host systems, tests and benchmarks:
//!
//! - [`StatSheet`]: base value plus additive modifiers per stat
//! - [`ClassCatalog`]: class code → trait codes, loadable from JSON
//! - [`GridWorld`]: per-block light and room data
//! - [`EntityRegistry`]: host numeric ids ↔ tstab `EntityId`s

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tstab_core::collaborators::{
    ClassRegistry, EnvironmentSampler, LightChannel, LightSample, RoomTopology, StatBlender,
};
use tstab_core::error::{Result, TstabError};
use tstab_core::types::{BlockPos, EntityId};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One stat: a base value and named additive modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StatEntry {
    base: f32,
    modifiers: HashMap<String, f32>,
}

/// Per-entity stat storage, blended as `base + Σ modifiers`.
///
/// Multiplier stats such as `surfaceStabilityLoss` have base 1.0; a class
/// that loses 5% stability on the surface adds a `-0.05` modifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    stats: HashMap<String, StatEntry>,
}

impl StatSheet {
    /// Create an empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet with every stat the rule system and damage hooks read at 1.0.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut sheet = Self::new();
        for stat in [
            "surfaceStabilityLoss",
            "caveStabilityLoss",
            tstab_core::damage::FIRE_DAMAGE_STAT,
            tstab_core::damage::RUSTED_DAMAGE_STAT,
            tstab_core::damage::MECHANICAL_DAMAGE_STAT,
        ] {
            sheet.set_base(stat, 1.0);
        }
        sheet
    }

    /// Set (or create) a stat's base value.
    pub fn set_base(&mut self, stat: &str, base: f32) {
        self.stats.entry(stat.to_string()).or_default().base = base;
    }

    /// Add or replace a named modifier on a stat. Creates the stat at base 0.
    pub fn set_modifier(&mut self, stat: &str, source: &str, value: f32) {
        self.stats
            .entry(stat.to_string())
            .or_default()
            .modifiers
            .insert(source.to_string(), value);
    }

    /// Remove a named modifier. Returns whether it existed.
    pub fn remove_modifier(&mut self, stat: &str, source: &str) -> bool {
        self.stats
            .get_mut(stat)
            .is_some_and(|entry| entry.modifiers.remove(source).is_some())
    }
}

impl StatBlender for StatSheet {
    fn blended(&self, stat: &str) -> Result<f32> {
        let entry = self
            .stats
            .get(stat)
            .ok_or_else(|| TstabError::UnknownStat(stat.to_string()))?;
        Ok(entry.base + entry.modifiers.values().sum::<f32>())
    }
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

/// One class as it appears in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Class code stored on the entity.
    pub code: String,
    /// Trait codes granted by the class.
    #[serde(default)]
    pub traits: Vec<String>,
}

/// All classes known to the host.
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    classes: HashMap<String, Vec<String>>,
}

impl ClassCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a class.
    pub fn insert(&mut self, definition: ClassDefinition) {
        self.classes.insert(definition.code, definition.traits);
    }

    /// Parse a JSON array of `{"code": ..., "traits": [...]}` objects.
    ///
    /// # Errors
    /// Returns `TstabError::Catalog` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<ClassDefinition> =
            serde_json::from_str(json).map_err(|e| TstabError::Catalog(e.to_string()))?;
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        debug!(classes = catalog.len(), "Loaded class catalog");
        Ok(catalog)
    }

    /// Load a JSON catalog from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassRegistry for ClassCatalog {
    fn class_traits(&self, class_code: &str) -> Option<Vec<String>> {
        self.classes.get(class_code).cloned()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Sparse block world. Unset blocks are dark and outside any room.
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    light: HashMap<BlockPos, LightSample>,
    rooms: HashMap<BlockPos, RoomTopology>,
}

impl GridWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all light channels at a block.
    pub fn set_light(&mut self, pos: BlockPos, sun: u8, block: u8) {
        self.light.insert(
            pos,
            LightSample {
                sun,
                block,
                total: sun.max(block),
            },
        );
    }

    /// Mark a block as inside a room.
    pub fn set_room(&mut self, pos: BlockPos, room: RoomTopology) {
        self.rooms.insert(pos, room);
    }

    /// Remove any room at a block.
    pub fn clear_room(&mut self, pos: BlockPos) {
        self.rooms.remove(&pos);
    }
}

impl EnvironmentSampler for GridWorld {
    fn light_level(&self, pos: BlockPos, channel: LightChannel) -> Result<u8> {
        let sample = self.light.get(&pos).copied().unwrap_or_default();
        Ok(match channel {
            LightChannel::Sun => sample.sun,
            LightChannel::Block => sample.block,
            LightChannel::Total => sample.total,
        })
    }

    fn room_at(&self, pos: BlockPos) -> Result<Option<RoomTopology>> {
        Ok(self.rooms.get(&pos).copied())
    }
}

// ---------------------------------------------------------------------------
// Entity ID Mapping
// ---------------------------------------------------------------------------

/// Bidirectional map between host entity ids and tstab `EntityId`s.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    host_to_tstab: HashMap<u64, EntityId>,
    tstab_to_host: HashMap<EntityId, u64>,
}

impl EntityRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the `EntityId` for a host entity.
    pub fn entity(&mut self, host_id: u64) -> EntityId {
        *self.host_to_tstab.entry(host_id).or_insert_with(|| {
            let id = EntityId::new();
            self.tstab_to_host.insert(id, host_id);
            id
        })
    }

    /// Look up the host id for an `EntityId`.
    #[must_use]
    pub fn host_id(&self, entity: &EntityId) -> Option<u64> {
        self.tstab_to_host.get(entity).copied()
    }

    /// Forget a despawned host entity.
    pub fn remove(&mut self, host_id: u64) -> Option<EntityId> {
        let id = self.host_to_tstab.remove(&host_id)?;
        self.tstab_to_host.remove(&id);
        Some(id)
    }

    /// Total registered entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.host_to_tstab.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn stat_sheet_blends_base_and_modifiers() {
        let mut sheet = StatSheet::with_defaults();
        assert!((sheet.blended("surfaceStabilityLoss").expect("stat") - 1.0).abs() < f32::EPSILON);

        sheet.set_modifier("surfaceStabilityLoss", "class", -0.05);
        sheet.set_modifier("surfaceStabilityLoss", "armor", 0.02);
        let blended = sheet.blended("surfaceStabilityLoss").expect("stat");
        assert!((blended - 0.97).abs() < 1e-6);

        assert!(sheet.remove_modifier("surfaceStabilityLoss", "armor"));
        assert!(!sheet.remove_modifier("surfaceStabilityLoss", "armor"));
        let blended = sheet.blended("surfaceStabilityLoss").expect("stat");
        assert!((blended - 0.95).abs() < 1e-6);
    }

    #[test]
    fn unknown_stat_is_an_error() {
        let err = StatSheet::new().blended("walkspeed").unwrap_err();
        assert!(matches!(err, TstabError::UnknownStat(s) if s == "walkspeed"));
    }

    const CATALOG: &str = r#"[
        {"code": "miner", "traits": ["shelteredstone", "agoraphobia"]},
        {"code": "commoner"}
    ]"#;

    #[test]
    fn catalog_parses_json() {
        let catalog = ClassCatalog::from_json(CATALOG).expect("parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.class_traits("miner"),
            Some(vec!["shelteredstone".to_string(), "agoraphobia".to_string()])
        );
        assert_eq!(catalog.class_traits("commoner"), Some(Vec::new()));
        assert_eq!(catalog.class_traits("hunter"), None);
    }

    #[test]
    fn malformed_catalog_is_catalog_error() {
        let err = ClassCatalog::from_json("{\"code\": 1}").unwrap_err();
        assert!(matches!(err, TstabError::Catalog(_)));
    }

    #[test]
    fn catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(CATALOG.as_bytes()).expect("write");
        let catalog = ClassCatalog::from_file(file.path()).expect("load");
        assert!(!catalog.is_empty());

        let missing = ClassCatalog::from_file(Path::new("/nonexistent/classes.json"));
        assert!(matches!(missing, Err(TstabError::Io(_))));
    }

    #[test]
    fn grid_world_defaults_to_dark_open_air() {
        let mut world = GridWorld::new();
        let pos = BlockPos::new(4, 64, 4);
        assert_eq!(world.light_level(pos, LightChannel::Sun).expect("light"), 0);
        assert_eq!(world.room_at(pos).expect("room"), None);

        world.set_light(pos, 3, 12);
        world.set_room(pos, RoomTopology::new(0, 1, 9));
        assert_eq!(world.light_level(pos, LightChannel::Sun).expect("light"), 3);
        assert_eq!(world.light_level(pos, LightChannel::Total).expect("light"), 12);
        assert!(world.room_at(pos).expect("room").is_some_and(|r| r.is_enclosed()));

        world.clear_room(pos);
        assert_eq!(world.room_at(pos).expect("room"), None);
    }

    #[test]
    fn entity_registry_is_stable() {
        let mut registry = EntityRegistry::new();
        let a = registry.entity(7);
        assert_eq!(registry.entity(7), a);
        assert_eq!(registry.host_id(&a), Some(7));
        assert_eq!(registry.count(), 1);

        assert_eq!(registry.remove(7), Some(a));
        assert_eq!(registry.host_id(&a), None);
        assert_eq!(registry.count(), 0);
    }
}
