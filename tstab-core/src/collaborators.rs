//! Contracts for the host services the rule system reads from.
//!
//! The core never reaches into global game state. Each tick the host hands
//! in read-only capabilities implementing these traits, which keeps the
//! evaluator deterministic under test.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::BlockPos;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Blended per-entity statistics.
///
/// The convention depends on the stat: some are multipliers around 1.0 whose
/// raw delta is `blended - 1`, others are used as plain multipliers. Callers
/// must know which one they are asking for.
pub trait StatBlender {
    /// Effective value of `stat` after all active modifiers.
    ///
    /// # Errors
    /// Returns an error if the stat service cannot produce a value.
    fn blended(&self, stat: &str) -> Result<f32>;
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Which light contribution to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightChannel {
    /// Light attributable to open sky only.
    Sun,
    /// Light emitted by blocks only.
    Block,
    /// The brighter of the two.
    Total,
}

/// All three light channels at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightSample {
    /// Sky light.
    pub sun: u8,
    /// Block light.
    pub block: u8,
    /// Combined light.
    pub total: u8,
}

/// Shape of the room enclosing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomTopology {
    /// Openings leading out of the room.
    pub exit_count: u32,
    /// Ceiling tiles open to the sky.
    pub skylight_count: u32,
    /// Ceiling tiles that block the sky.
    pub non_skylight_count: u32,
}

impl RoomTopology {
    /// Create a room description.
    #[must_use]
    pub const fn new(exit_count: u32, skylight_count: u32, non_skylight_count: u32) -> Self {
        Self {
            exit_count,
            skylight_count,
            non_skylight_count,
        }
    }

    /// No exits and more opaque ceiling than sky openings.
    #[must_use]
    pub fn is_enclosed(&self) -> bool {
        self.exit_count == 0 && self.skylight_count < self.non_skylight_count
    }
}

/// Read-only view of the world around an entity.
pub trait EnvironmentSampler {
    /// Light level on one channel.
    ///
    /// # Errors
    /// Returns an error if the light service fails.
    fn light_level(&self, pos: BlockPos, channel: LightChannel) -> Result<u8>;

    /// Topology of the room enclosing `pos`, or `None` in open air or when
    /// the room data is not available yet.
    ///
    /// # Errors
    /// Returns an error only if the room service itself fails.
    fn room_at(&self, pos: BlockPos) -> Result<Option<RoomTopology>>;

    /// All three light channels at once.
    ///
    /// # Errors
    /// Propagates any failure of [`EnvironmentSampler::light_level`].
    fn sample_light(&self, pos: BlockPos) -> Result<LightSample> {
        Ok(LightSample {
            sun: self.light_level(pos, LightChannel::Sun)?,
            block: self.light_level(pos, LightChannel::Block)?,
            total: self.light_level(pos, LightChannel::Total)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

/// Lookup from class code to the trait codes that class grants.
pub trait ClassRegistry {
    /// Trait codes of `class_code`, or `None` if the class is not (yet) known.
    fn class_traits(&self, class_code: &str) -> Option<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLight;

    impl EnvironmentSampler for FixedLight {
        fn light_level(&self, _pos: BlockPos, channel: LightChannel) -> Result<u8> {
            Ok(match channel {
                LightChannel::Sun => 3,
                LightChannel::Block => 14,
                LightChannel::Total => 14,
            })
        }

        fn room_at(&self, _pos: BlockPos) -> Result<Option<RoomTopology>> {
            Ok(None)
        }
    }

    #[test]
    fn sample_light_reads_every_channel() {
        let sample = FixedLight.sample_light(BlockPos::default()).expect("light");
        assert_eq!(sample, LightSample { sun: 3, block: 14, total: 14 });
    }

    #[test]
    fn enclosure_requires_no_exits_and_mostly_roof() {
        assert!(RoomTopology::new(0, 2, 5).is_enclosed());
        assert!(!RoomTopology::new(1, 2, 5).is_enclosed());
        assert!(!RoomTopology::new(0, 5, 5).is_enclosed());
        assert!(!RoomTopology::new(0, 0, 0).is_enclosed());
    }
}
