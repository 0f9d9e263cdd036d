//! Count-conditioned strategy deviations overlaid on the basic-strategy advisor.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::hand::Hand;
use crate::rules::Rules;
use crate::strategy::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviationCategory {
    Hit17,
    Stand17,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CountCondition {
    TrueCountAtLeast(i32),
    TrueCountAtMost(i32),
    RunningPositive,
    RunningNegative,
}

impl CountCondition {
    fn matches(&self, running_count: i32, true_count: f64) -> bool {
        let floored_tc = true_count.floor() as i32;
        match *self {
            CountCondition::TrueCountAtLeast(k) => floored_tc >= k,
            CountCondition::TrueCountAtMost(k) => floored_tc <= k,
            CountCondition::RunningPositive => running_count > 0,
            CountCondition::RunningNegative => running_count < 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationRule {
    pub category: DeviationCategory,
    pub player_total: u16,
    pub is_soft: bool,
    pub pair_rank: Option<u8>,
    pub dealer_value: u8,
    pub action: Action,
    pub count_condition: CountCondition,
    pub enabled: bool,
}

/// Overlays `deviations` on top of `base_action`. Rules are iterated in input
/// order; each matching, enabled rule overwrites the current action, so the
/// last match in iteration order wins.
pub fn apply(
    base_action: Action,
    hand: &Hand,
    dealer_up: Card,
    running_count: i32,
    true_count: f64,
    rules: &Rules,
    deviations: &[DeviationRule],
) -> Action {
    let mut action = base_action;
    for rule in deviations {
        if rule.enabled && rule_matches(rule, hand, dealer_up, running_count, true_count, rules) {
            action = rule.action;
        }
    }
    action
}

fn rule_matches(
    rule: &DeviationRule,
    hand: &Hand,
    dealer_up: Card,
    running_count: i32,
    true_count: f64,
    rules: &Rules,
) -> bool {
    let category_gate = match rule.category {
        DeviationCategory::All => true,
        DeviationCategory::Hit17 => rules.dealer_hits_soft_17,
        DeviationCategory::Stand17 => !rules.dealer_hits_soft_17,
    };
    if !category_gate {
        return false;
    }

    if hand.best_value() != rule.player_total {
        return false;
    }
    if hand.is_soft() != rule.is_soft {
        return false;
    }
    if let Some(pair_rank) = rule.pair_rank {
        if hand.pair_rank() != Some(pair_rank) {
            return false;
        }
    }
    if dealer_up.value() != rule.dealer_value {
        return false;
    }

    let action_feasible = match rule.action {
        Action::Split => hand.can_split(),
        Action::Double => hand.len() == 2,
        Action::Surrender => hand.len() == 2 && rules.surrender_allowed,
        Action::Hit | Action::Stand => true,
    };
    if !action_feasible {
        return false;
    }

    rule.count_condition.matches(running_count, true_count)
}
