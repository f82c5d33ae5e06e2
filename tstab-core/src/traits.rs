//! Stability traits and the fixed set an entity can carry.
//!
//! Only three traits affect temporal stability. They are matched by code
//! against the trait list of the entity's class; everything else in that list
//! is somebody else's business.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TraitCodesConfig;

/// A behavioral trait that modifies stability velocity.
///
/// Declaration order is rule priority order: earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StabilityTrait {
    /// Underground the entity recovers stability instead of losing it.
    ShelteredByStone,
    /// Exposed to open sky the entity loses stability.
    Agoraphobia,
    /// Underground, any existing loss is scaled by the cave-loss stat.
    Claustrophobia,
}

impl StabilityTrait {
    /// All traits in priority order.
    pub const ALL: [Self; 3] = [Self::ShelteredByStone, Self::Agoraphobia, Self::Claustrophobia];

    /// The class trait code for this trait under the given configuration.
    #[must_use]
    pub fn code(self, codes: &TraitCodesConfig) -> &str {
        match self {
            Self::ShelteredByStone => &codes.sheltered_by_stone,
            Self::Agoraphobia => &codes.agoraphobia,
            Self::Claustrophobia => &codes.claustrophobia,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::ShelteredByStone => 1,
            Self::Agoraphobia => 1 << 1,
            Self::Claustrophobia => 1 << 2,
        }
    }
}

impl fmt::Display for StabilityTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ShelteredByStone => "sheltered-by-stone",
            Self::Agoraphobia => "agoraphobia",
            Self::Claustrophobia => "claustrophobia",
        };
        f.write_str(name)
    }
}

/// A subset of [`StabilityTrait`]. The empty set is a valid, terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TraitSet(u8);

impl TraitSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Set containing all three traits.
    #[must_use]
    pub fn all() -> Self {
        StabilityTrait::ALL.into_iter().collect()
    }

    /// Build the set from a class's trait codes. Unrelated codes are ignored
    /// and duplicates collapse.
    #[must_use]
    pub fn from_codes<S: AsRef<str>>(class_codes: &[S], codes: &TraitCodesConfig) -> Self {
        StabilityTrait::ALL
            .into_iter()
            .filter(|t| class_codes.iter().any(|c| c.as_ref() == t.code(codes)))
            .collect()
    }

    /// Whether `t` is in the set.
    #[must_use]
    pub fn contains(self, t: StabilityTrait) -> bool {
        self.0 & t.bit() != 0
    }

    /// Add `t` to the set.
    pub fn insert(&mut self, t: StabilityTrait) {
        self.0 |= t.bit();
    }

    /// Whether no stability trait applies.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of traits in the set.
    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate in priority order.
    pub fn iter(self) -> impl Iterator<Item = StabilityTrait> {
        StabilityTrait::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<StabilityTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = StabilityTrait>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        let names: Vec<String> = self.iter().map(|t| t.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_codes_picks_only_stability_traits() {
        let codes = TraitCodesConfig::default();
        let class = ["agoraphobia", "silvertongue", "hardy", "claustrophobicblessed"];
        let set = TraitSet::from_codes(&class, &codes);

        assert!(set.contains(StabilityTrait::Agoraphobia));
        assert!(set.contains(StabilityTrait::Claustrophobia));
        assert!(!set.contains(StabilityTrait::ShelteredByStone));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn unrelated_codes_give_empty_set() {
        let codes = TraitCodesConfig::default();
        let set = TraitSet::from_codes(&["nightvision".to_string()], &codes);
        assert!(set.is_empty());
    }

    #[test]
    fn iteration_follows_priority() {
        let set: TraitSet = [StabilityTrait::Claustrophobia, StabilityTrait::ShelteredByStone]
            .into_iter()
            .collect();
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec![StabilityTrait::ShelteredByStone, StabilityTrait::Claustrophobia]);
    }

    #[test]
    fn custom_codes_are_honoured() {
        let codes = TraitCodesConfig {
            agoraphobia: "fearofsky".to_string(),
            ..TraitCodesConfig::default()
        };
        assert!(TraitSet::from_codes(&["fearofsky"], &codes).contains(StabilityTrait::Agoraphobia));
        assert!(TraitSet::from_codes(&["agoraphobia"], &codes).is_empty());
    }

    #[test]
    fn display_lists_traits() {
        assert_eq!(TraitSet::EMPTY.to_string(), "{}");
        assert_eq!(
            TraitSet::all().to_string(),
            "{sheltered-by-stone, agoraphobia, claustrophobia}"
        );
    }
}
