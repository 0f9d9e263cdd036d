//! Combines per-reality outcomes into the final result record.

use serde::{Deserialize, Serialize};

use crate::debug::DebugLog;
use crate::reality::RealityOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub ev_per_hour: f64,
    pub sd_per_hour: f64,
    pub risk_of_ruin: f64,
    pub average_bet: f64,
    pub median_bet: f64,
    pub positive_outcome_fraction: f64,
    pub best_ending_bankroll: f64,
    pub worst_ending_bankroll: f64,
    pub hours_to_bust_worst: Option<f64>,
    pub ev_per_hand: f64,
    pub sd_per_hand: f64,
    #[serde(skip)]
    pub debug_log: Option<DebugLog>,
}

/// Aggregates every reality's flat profit/wager lists into `SimulationResult`
/// (sample SD with Bessel's correction, even/odd median, ruin/positive-outcome
/// fractions by reality index rather than completion order).
///
/// Returns the result alongside how many debug records were dropped while
/// merging per-reality logs into the shared 5,000-record cap, so the caller
/// can log a truncation notice instead of silently discarding them.
pub fn aggregate(outcomes: &[RealityOutcome], hands_per_hour: u32, debug_enabled: bool) -> (SimulationResult, usize) {
    let num_realities = outcomes.len().max(1) as f64;

    let mut profits: Vec<f64> = Vec::new();
    let mut wagers: Vec<f64> = Vec::new();
    for outcome in outcomes {
        profits.extend_from_slice(&outcome.profits);
        wagers.extend_from_slice(&outcome.wagers);
    }

    let ev_per_hand = mean(&profits);
    let sd_per_hand = sample_sd(&profits, ev_per_hand);
    let ev_per_hour = ev_per_hand * hands_per_hour as f64;
    let sd_per_hour = sd_per_hand * (hands_per_hour as f64).sqrt();

    let average_bet = mean(&wagers);
    let median_bet = median(&wagers);

    let ruined_count = outcomes.iter().filter(|o| o.ruined).count() as f64;
    let risk_of_ruin = ruined_count / num_realities;

    let positive_count = outcomes
        .iter()
        .filter(|o| o.ending_bankroll > o.starting_bankroll)
        .count() as f64;
    let positive_outcome_fraction = positive_count / num_realities;

    let best_ending_bankroll = outcomes
        .iter()
        .map(|o| o.ending_bankroll)
        .fold(f64::NEG_INFINITY, f64::max);
    let worst_ending_bankroll = outcomes
        .iter()
        .map(|o| o.ending_bankroll)
        .fold(f64::INFINITY, f64::min);

    let hours_to_bust_worst = outcomes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.ending_bankroll.total_cmp(&b.ending_bankroll))
        .and_then(|(_, worst)| worst.bust_hand_index)
        .map(|bust_hand_index| bust_hand_index as f64 / hands_per_hour as f64);

    let (debug_log, dropped) = if debug_enabled {
        let logs: Vec<DebugLog> = outcomes.iter().map(|o| o.debug_log.clone()).collect();
        let (merged, dropped) = DebugLog::merge_capped(logs);
        (Some(merged), dropped)
    } else {
        (None, 0)
    };

    let result = SimulationResult {
        ev_per_hour,
        sd_per_hour,
        risk_of_ruin,
        average_bet,
        median_bet,
        positive_outcome_fraction,
        best_ending_bankroll: if outcomes.is_empty() { 0.0 } else { best_ending_bankroll },
        worst_ending_bankroll: if outcomes.is_empty() { 0.0 } else { worst_ending_bankroll },
        hours_to_bust_worst,
        ev_per_hand,
        sd_per_hand,
        debug_log,
    };
    (result, dropped)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation with Bessel's `n - 1` correction; 0 when
/// `values.len() <= 1`.
fn sample_sd(values: &[f64], mean_value: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean_value).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(profits: Vec<f64>, wagers: Vec<f64>, starting: f64, ending: f64, ruined: bool, bust: Option<u64>) -> RealityOutcome {
        RealityOutcome {
            profits,
            wagers,
            ruined,
            bust_hand_index: bust,
            starting_bankroll: starting,
            ending_bankroll: ending,
            debug_log: DebugLog::new(),
        }
    }

    #[test]
    fn ev_and_sd_scale_correctly_to_hourly_figures() {
        let outcomes = vec![outcome(vec![10.0, -10.0, 0.0, 20.0], vec![10.0, 10.0, 10.0, 10.0], 1000.0, 1020.0, false, None)];
        let (result, _) = aggregate(&outcomes, 70, false);
        assert_eq!(result.ev_per_hand, mean(&[10.0, -10.0, 0.0, 20.0]));
        assert_eq!(result.ev_per_hour, result.ev_per_hand * 70.0);
        assert_eq!(result.sd_per_hour, result.sd_per_hand * 70f64.sqrt());
    }

    #[test]
    fn single_sample_has_zero_standard_deviation() {
        let outcomes = vec![outcome(vec![5.0], vec![10.0], 1000.0, 1005.0, false, None)];
        let (result, _) = aggregate(&outcomes, 70, false);
        assert_eq!(result.sd_per_hand, 0.0);
    }

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(median(&[10.0, 20.0, 30.0]), 20.0);
        assert_eq!(median(&[10.0, 20.0, 30.0, 40.0]), 25.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn risk_of_ruin_and_positive_outcome_fraction() {
        let outcomes = vec![
            outcome(vec![-10.0], vec![10.0], 100.0, 0.0, true, Some(3)),
            outcome(vec![50.0], vec![10.0], 100.0, 150.0, false, None),
            outcome(vec![-5.0], vec![10.0], 100.0, 95.0, false, None),
        ];
        let (result, _) = aggregate(&outcomes, 70, false);
        assert!((result.risk_of_ruin - (1.0 / 3.0)).abs() < 1e-9);
        assert!((result.positive_outcome_fraction - (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn hours_to_bust_worst_uses_reality_with_minimum_bankroll_not_completion_order() {
        let outcomes = vec![
            outcome(vec![0.0], vec![10.0], 100.0, 50.0, false, None),
            outcome(vec![0.0], vec![10.0], 100.0, 10.0, true, Some(140)),
        ];
        let (result, _) = aggregate(&outcomes, 70, false);
        assert_eq!(result.hours_to_bust_worst, Some(140.0 / 70.0));
        assert_eq!(result.worst_ending_bankroll, 10.0);
    }

    #[test]
    fn hours_to_bust_worst_is_none_when_worst_reality_never_busted() {
        let outcomes = vec![outcome(vec![0.0], vec![10.0], 100.0, 80.0, false, None)];
        let (result, _) = aggregate(&outcomes, 70, false);
        assert_eq!(result.hours_to_bust_worst, None);
    }
}
