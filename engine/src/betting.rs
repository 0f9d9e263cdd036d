//! Count-indexed bet ramp.

use serde::{Deserialize, Serialize};

/// A single (true-count threshold, wager) entry in a bet ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampEntry {
    pub true_count_threshold: i32,
    pub bet: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRamp {
    pub min_bet: f64,
    pub entries: Vec<RampEntry>,
}

impl BetRamp {
    pub fn flat(min_bet: f64) -> Self {
        BetRamp {
            min_bet,
            entries: Vec::new(),
        }
    }

    /// The wager for a given true count: the bet of the highest threshold
    /// `<= true_count`, floored at `min_bet`.
    pub fn wager_for(&self, true_count: f64) -> f64 {
        let floored_tc = true_count.floor() as i32;
        let best = self
            .entries
            .iter()
            .filter(|e| e.true_count_threshold <= floored_tc)
            .max_by_key(|e| e.true_count_threshold)
            .map(|e| e.bet);
        best.unwrap_or(self.min_bet).max(self.min_bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_ramp_always_returns_min_bet() {
        let ramp = BetRamp::flat(10.0);
        for tc in [-5.0, 0.0, 3.7, 20.0] {
            assert_eq!(ramp.wager_for(tc), 10.0);
        }
    }

    #[test]
    fn ramp_picks_highest_threshold_not_exceeding_true_count() {
        let ramp = BetRamp {
            min_bet: 10.0,
            entries: vec![
                RampEntry { true_count_threshold: 1, bet: 20.0 },
                RampEntry { true_count_threshold: 2, bet: 40.0 },
                RampEntry { true_count_threshold: 3, bet: 80.0 },
                RampEntry { true_count_threshold: 4, bet: 100.0 },
            ],
        };
        assert_eq!(ramp.wager_for(-1.0), 10.0);
        assert_eq!(ramp.wager_for(0.9), 10.0);
        assert_eq!(ramp.wager_for(1.0), 20.0);
        assert_eq!(ramp.wager_for(2.9), 20.0);
        assert_eq!(ramp.wager_for(3.0), 80.0);
        assert_eq!(ramp.wager_for(100.0), 100.0);
    }

    #[test]
    fn wager_is_floored_at_true_count_integer() {
        let ramp = BetRamp {
            min_bet: 10.0,
            entries: vec![RampEntry { true_count_threshold: 1, bet: 25.0 }],
        };
        // True count in (0, 1) floors to 0, so the TC>=1 entry should not fire yet.
        assert_eq!(ramp.wager_for(0.99), 10.0);
    }
}
