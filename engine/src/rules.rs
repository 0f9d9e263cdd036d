//! Immutable table-rules configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Number of 52-card decks in the shoe, in `[1, 8]`.
    pub decks: u8,
    /// Dealer hits soft 17 (H17) when true, stands (S17) when false.
    pub dealer_hits_soft_17: bool,
    /// Doubling after a split is permitted.
    pub double_after_split: bool,
    /// Late surrender is offered.
    pub surrender_allowed: bool,
    /// Net multiple paid on a player natural, e.g. `1.5` for 3:2, `1.2` for 6:5.
    pub blackjack_payout: f64,
    /// Fraction of the shoe dealt before the cut card forces a reshuffle, in `[0.5, 0.95]`.
    pub penetration: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            decks: 6,
            dealer_hits_soft_17: false,
            double_after_split: true,
            surrender_allowed: true,
            blackjack_payout: 1.5,
            penetration: 0.75,
        }
    }
}
