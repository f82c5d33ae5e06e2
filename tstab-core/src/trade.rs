//! Trade-price adjustment for the silver tongue trait.
//!
//! A trade computes its totals first; the adjustment runs afterwards on the
//! finished numbers. Costs the player pays shrink by `rate` and gains the
//! player receives grow by `rate`, each rounded half-to-even to whole coins.

use crate::collaborators::ClassRegistry;
use crate::config::{TradeConfig, TraitCodesConfig};

/// Whole-coin totals for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradeTotals {
    /// What the player pays.
    pub cost: i64,
    /// What the player receives.
    pub gain: i64,
}

impl TradeTotals {
    /// Create totals.
    #[must_use]
    pub const fn new(cost: i64, gain: i64) -> Self {
        Self { cost, gain }
    }
}

/// Applies the silver tongue discount and bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeAdjuster {
    rate: f32,
}

impl TradeAdjuster {
    /// Create an adjuster with the configured rate.
    #[must_use]
    pub fn new(config: &TradeConfig) -> Self {
        Self {
            rate: config.silver_tongue_rate,
        }
    }

    /// Fraction taken off costs and added to gains.
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Discount a cost. Zero and negative costs pass through.
    #[must_use]
    pub fn adjust_cost(&self, cost: i64) -> i64 {
        if cost > 0 { cost - self.share(cost) } else { cost }
    }

    /// Boost a gain. Zero and negative gains pass through.
    #[must_use]
    pub fn adjust_gain(&self, gain: i64) -> i64 {
        if gain > 0 { gain + self.share(gain) } else { gain }
    }

    /// Run `compute` and, for a silver-tongued trader, adjust its result.
    pub fn settle<F>(&self, has_silver_tongue: bool, compute: F) -> TradeTotals
    where
        F: FnOnce() -> TradeTotals,
    {
        let totals = compute();
        if !has_silver_tongue {
            return totals;
        }
        TradeTotals {
            cost: self.adjust_cost(totals.cost),
            gain: self.adjust_gain(totals.gain),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn share(&self, amount: i64) -> i64 {
        (amount as f32 * self.rate).round_ties_even() as i64
    }
}

impl Default for TradeAdjuster {
    fn default() -> Self {
        Self::new(&TradeConfig::default())
    }
}

/// Whether the class carries the silver tongue trait code.
#[must_use]
pub fn has_silver_tongue(
    class_code: Option<&str>,
    registry: &dyn ClassRegistry,
    codes: &TraitCodesConfig,
) -> bool {
    class_code
        .and_then(|code| registry.class_traits(code))
        .is_some_and(|traits| traits.iter().any(|t| *t == codes.silver_tongue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_rounds_half_to_even() {
        let adj = TradeAdjuster::default();
        assert_eq!(adj.adjust_cost(100), 75);
        // 10 * 0.25 = 2.5 rounds to 2.
        assert_eq!(adj.adjust_cost(10), 8);
        // 6 * 0.25 = 1.5 rounds to 2.
        assert_eq!(adj.adjust_cost(6), 4);
        assert_eq!(adj.adjust_cost(1), 1);
    }

    #[test]
    fn gain_rounds_half_to_even() {
        let adj = TradeAdjuster::default();
        assert_eq!(adj.adjust_gain(100), 125);
        assert_eq!(adj.adjust_gain(10), 12);
        // 2 * 0.25 = 0.5 rounds to 0.
        assert_eq!(adj.adjust_gain(2), 2);
    }

    #[test]
    fn non_positive_amounts_pass_through() {
        let adj = TradeAdjuster::default();
        assert_eq!(adj.adjust_cost(0), 0);
        assert_eq!(adj.adjust_cost(-4), -4);
        assert_eq!(adj.adjust_gain(0), 0);
        assert_eq!(adj.adjust_gain(-4), -4);
    }

    #[test]
    fn settle_only_adjusts_silver_tongue() {
        let adj = TradeAdjuster::default();
        let plain = adj.settle(false, || TradeTotals::new(40, 20));
        assert_eq!(plain, TradeTotals::new(40, 20));
        let smooth = adj.settle(true, || TradeTotals::new(40, 20));
        assert_eq!(smooth, TradeTotals::new(30, 25));
    }

    struct Tailors;

    impl ClassRegistry for Tailors {
        fn class_traits(&self, class_code: &str) -> Option<Vec<String>> {
            (class_code == "tailor").then(|| vec!["silvertongue".to_string()])
        }
    }

    #[test]
    fn silver_tongue_lookup() {
        let codes = TraitCodesConfig::default();
        assert!(has_silver_tongue(Some("tailor"), &Tailors, &codes));
        assert!(!has_silver_tongue(Some("smith"), &Tailors, &codes));
        assert!(!has_silver_tongue(None, &Tailors, &codes));
    }
}
