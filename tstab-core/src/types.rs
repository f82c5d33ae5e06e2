//! Core type definitions shared across the tstab crates.
//!
//! Identity, world positions and simulated time. Everything here is `Copy`
//! and serializable so hosts can stash it in their own components freely.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for any ticking entity (player, NPC, creature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// Integer block position in the game world.
///
/// Light and room lookups are block-granular, so entity positions are
/// floored into a `BlockPos` before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate (height).
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Floor a continuous entity position into the containing block.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_entity_pos(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Monotonic simulated time in seconds since the entity started ticking.
///
/// The host never hands the core wall-clock time; every timing decision is
/// driven by accumulated tick deltas so it can be replayed in tests.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct SimTime(pub f64);

impl SimTime {
    /// Time zero.
    pub const ZERO: Self = Self(0.0);

    /// Seconds since time zero.
    #[must_use]
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Advance by a tick delta. Negative deltas are ignored to keep the
    /// clock monotonic.
    #[must_use]
    pub fn advanced(self, delta_seconds: f32) -> Self {
        Self(self.0 + f64::from(delta_seconds.max(0.0)))
    }
}

impl Sub for SimTime {
    type Output = f64;

    fn sub(self, rhs: Self) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
