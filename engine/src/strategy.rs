//! Pure basic-strategy advisor: `(hand, dealer upcard, rules) -> Action`.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::hand::Hand;
use crate::rules::Rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

/// Basic-strategy action for `hand` against `dealer_up`, honoring the DAS
/// downgrade (Double -> Hit when the hand came from a split and DAS is off).
///
/// Rule families are checked in order; the first family that applies wins:
/// late surrender, pair splits, soft totals, hard totals.
pub fn base_action(hand: &Hand, dealer_up: Card, rules: &Rules) -> Action {
    let dealer_value = dealer_up.value();
    let best = hand.best_value();

    let action = late_surrender(hand, dealer_value, rules)
        .or_else(|| pair_split(hand, dealer_value))
        .or_else(|| soft_total(hand, best, dealer_value))
        .or_else(|| hard_total(best, dealer_value));

    let action = action.expect("advisor is total for every hand with best_value <= 21");

    if action == Action::Double && hand.from_split && !rules.double_after_split {
        Action::Hit
    } else {
        action
    }
}

fn late_surrender(hand: &Hand, dealer_value: u8, rules: &Rules) -> Option<Action> {
    if !rules.surrender_allowed || hand.len() != 2 {
        return None;
    }
    let best = hand.best_value();
    if best == 16 && matches!(dealer_value, 9 | 10 | 11) {
        return Some(Action::Surrender);
    }
    if best == 15 && dealer_value == 10 {
        return Some(Action::Surrender);
    }
    None
}

fn pair_split(hand: &Hand, dealer_value: u8) -> Option<Action> {
    let rank = hand.pair_rank()?;
    let pair_value = Card::new(rank).value();

    let action = match pair_value {
        11 => Action::Split, // Aces
        8 => Action::Split,
        10 => Action::Stand,
        9 => {
            if matches!(dealer_value, 2..=6 | 8 | 9) {
                Action::Split
            } else {
                Action::Stand
            }
        }
        7 | 2 | 3 => {
            if dealer_value <= 7 {
                Action::Split
            } else {
                Action::Hit
            }
        }
        6 => {
            if dealer_value <= 6 {
                Action::Split
            } else {
                Action::Hit
            }
        }
        4 => {
            if matches!(dealer_value, 5 | 6) {
                Action::Split
            } else {
                Action::Hit
            }
        }
        5 => return hard_total(10, dealer_value),
        _ => unreachable!("card value is always in 2..=11"),
    };
    Some(action)
}

fn soft_total(hand: &Hand, best: u16, dealer_value: u8) -> Option<Action> {
    if !hand.is_soft() {
        return None;
    }
    let action = match best {
        13 | 14 => {
            if matches!(dealer_value, 5 | 6) {
                Action::Double
            } else {
                Action::Hit
            }
        }
        15 | 16 => {
            if matches!(dealer_value, 4..=6) {
                Action::Double
            } else {
                Action::Hit
            }
        }
        17 => {
            if matches!(dealer_value, 3..=6) {
                Action::Double
            } else {
                Action::Hit
            }
        }
        18 => {
            if matches!(dealer_value, 2..=6) {
                Action::Double
            } else if matches!(dealer_value, 7 | 8) {
                Action::Stand
            } else {
                Action::Hit
            }
        }
        19 => {
            if dealer_value == 6 {
                Action::Double
            } else {
                Action::Stand
            }
        }
        _ => Action::Stand, // soft 20+
    };
    Some(action)
}

/// The soft/hard total chart only, skipping the pair-split family. Used by the
/// hand player when a pair has reached the split-depth limit and must be
/// played as an ordinary hand instead.
pub(crate) fn total_only_action(hand: &Hand, dealer_value: u8) -> Action {
    let best = hand.best_value();
    soft_total(hand, best, dealer_value)
        .or_else(|| hard_total(best, dealer_value))
        .expect("soft/hard total families cover every best_value <= 21")
}

fn hard_total(best: u16, dealer_value: u8) -> Option<Action> {
    let action = if best <= 8 {
        Action::Hit
    } else if best == 9 {
        if matches!(dealer_value, 3..=6) {
            Action::Double
        } else {
            Action::Hit
        }
    } else if best == 10 {
        if matches!(dealer_value, 2..=9) {
            Action::Double
        } else {
            Action::Hit
        }
    } else if best == 11 {
        if dealer_value == 11 {
            Action::Hit
        } else {
            Action::Double
        }
    } else if best == 12 {
        if matches!(dealer_value, 4..=6) {
            Action::Stand
        } else {
            Action::Hit
        }
    } else if (13..=16).contains(&best) {
        if matches!(dealer_value, 2..=6) {
            Action::Stand
        } else {
            Action::Hit
        }
    } else {
        Action::Stand // 17+
    };
    Some(action)
}
