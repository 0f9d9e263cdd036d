//! Blackjack Monte Carlo expected-value engine.
//!
//! `simulate` is the sole entry point: given a [`SimulationInput`], it plays
//! `num_realities` independent bankroll trajectories in parallel and reduces
//! them into a [`SimulationResult`]. No I/O, no global state; every run is
//! fully described by its input.

pub mod aggregator;
pub mod betting;
pub mod card;
pub mod debug;
pub mod deviation;
pub mod error;
pub mod hand;
pub mod hand_player;
pub mod reality;
pub mod rules;
pub mod shoe;
pub mod strategy;

pub use aggregator::SimulationResult;
pub use error::EngineError;
pub use reality::SimulationInput;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Runs the simulation described by `input`, reporting completed-reality
/// counts through `progress` and polling `should_cancel` at each reality
/// boundary and at least every 500 hands within one.
///
/// Returns `Ok(None)` if cancelled before completion; cancellation is not an
/// error. Partial work from a cancelled run is discarded.
pub fn simulate(
    input: &SimulationInput,
    progress: impl Fn(u64) + Sync,
    should_cancel: impl Fn() -> bool + Sync,
) -> Result<Option<SimulationResult>, EngineError> {
    input.validate()?;

    tracing::info!(
        num_realities = input.num_realities,
        hands_per_reality = input.hands_per_reality(),
        bankroll = input.bankroll,
        debug = input.debug,
        "starting blackjack Monte Carlo run"
    );

    if should_cancel() {
        return Ok(None);
    }

    let base_seed = input.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let completed = std::sync::atomic::AtomicU64::new(0);

    let outcomes: Vec<Option<reality::RealityOutcome>> = (0..input.num_realities as u64)
        .into_par_iter()
        .map(|reality_index| -> Result<Option<reality::RealityOutcome>, EngineError> {
            let mut rng = StdRng::seed_from_u64(reality_seed(base_seed, reality_index));
            let outcome = reality::run_reality(reality_index, input, &mut rng, &should_cancel)?;
            if outcome.is_some() {
                let done = completed.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
                progress(done);
                tracing::debug!(reality = reality_index, "reality completed");
            }
            Ok(outcome)
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    if outcomes.iter().any(Option::is_none) {
        tracing::info!("run cancelled; discarding partial work");
        return Ok(None);
    }
    let outcomes: Vec<reality::RealityOutcome> = outcomes.into_iter().map(|o| o.unwrap()).collect();

    let (result, dropped) = aggregator::aggregate(&outcomes, input.hands_per_hour, input.debug);
    if dropped > 0 {
        tracing::debug!(dropped, "debug log truncated at the per-run cap");
    }

    tracing::info!(
        ev_per_hour = result.ev_per_hour,
        risk_of_ruin = result.risk_of_ruin,
        "run complete"
    );

    Ok(Some(result))
}

/// Derives a per-reality RNG seed from the run's base seed so realities are
/// mutually independent yet reproducible together.
fn reality_seed(base_seed: u64, reality_index: u64) -> u64 {
    base_seed
        .wrapping_add(reality_index.wrapping_mul(0x9E3779B97F4A7C15))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::BetRamp;
    use crate::rules::Rules;

    fn input(num_realities: u32, hands_per_hour: u32, hours: f64, seed: Option<u64>) -> SimulationInput {
        SimulationInput {
            rules: Rules::default(),
            betting: BetRamp::flat(10.0),
            hours_to_simulate: hours,
            hands_per_hour,
            num_realities,
            bankroll: 10_000.0,
            take_insurance: true,
            deviations: Vec::new(),
            seed,
            debug: false,
        }
    }

    #[test]
    fn invalid_input_is_rejected_before_any_work() {
        let mut bad = input(1, 70, 1.0, Some(1));
        bad.bankroll = 0.0;
        let result = simulate(&bad, |_| {}, || false);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn cancelled_run_returns_none() {
        let cfg = input(4, 70, 1.0, Some(1));
        let result = simulate(&cfg, |_| {}, || true).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn same_seed_reproduces_identical_aggregate_results() {
        let cfg = input(8, 70, 10.0, Some(42));
        let a = simulate(&cfg, |_| {}, || false).unwrap().unwrap();
        let b = simulate(&cfg, |_| {}, || false).unwrap().unwrap();
        assert_eq!(a.ev_per_hand, b.ev_per_hand);
        assert_eq!(a.sd_per_hand, b.sd_per_hand);
        assert_eq!(a.risk_of_ruin, b.risk_of_ruin);
    }

    #[test]
    fn progress_is_reported_once_per_completed_reality() {
        let cfg = input(5, 70, 1.0, Some(2));
        let count = std::sync::atomic::AtomicU64::new(0);
        simulate(&cfg, |_| { count.fetch_add(1, std::sync::atomic::Ordering::Relaxed); }, || false)
            .unwrap()
            .unwrap();
        assert_eq!(count.load(std::sync::atomic::Ordering::Relaxed), 5);
    }

    #[test]
    fn flat_bet_baseline_has_small_negative_edge_and_no_ruin() {
        let cfg = input(1, 70, 1000.0 / 70.0, Some(777));
        let result = simulate(&cfg, |_| {}, || false).unwrap().unwrap();
        assert!(result.ev_per_hand > -1.0 && result.ev_per_hand < 1.0);
        assert_eq!(result.risk_of_ruin, 0.0);
        assert_eq!(result.average_bet, 10.0);
        assert_eq!(result.median_bet, 10.0);
    }
}
