//! Simulation input and the per-reality bankroll loop.

use rand::Rng;

use crate::betting::BetRamp;
use crate::debug::DebugLog;
use crate::deviation::DeviationRule;
use crate::error::EngineError;
use crate::hand_player::{self, RoundRules};
use crate::rules::Rules;
use crate::shoe::Shoe;

use serde::{Deserialize, Serialize};

/// Cooperative yield/cancellation cadence within a reality.
const CANCEL_CHECK_INTERVAL: u64 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub rules: Rules,
    pub betting: BetRamp,
    pub hours_to_simulate: f64,
    pub hands_per_hour: u32,
    pub num_realities: u32,
    pub bankroll: f64,
    pub take_insurance: bool,
    pub deviations: Vec<DeviationRule>,
    /// When absent, each worker seeds its RNG from system entropy.
    pub seed: Option<u64>,
    pub debug: bool,
}

impl SimulationInput {
    /// Validates the input contract. Out-of-range values are the host's
    /// responsibility to clamp; the engine refuses to start rather than
    /// silently produce a meaningless result.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.hours_to_simulate <= 0.0 {
            return Err(EngineError::InvalidInput("hoursToSimulate must be > 0".into()));
        }
        if self.hands_per_hour < 1 {
            return Err(EngineError::InvalidInput("handsPerHour must be >= 1".into()));
        }
        if self.num_realities < 1 {
            return Err(EngineError::InvalidInput("numRealities must be >= 1".into()));
        }
        if self.bankroll <= 0.0 {
            return Err(EngineError::InvalidInput("bankroll must be > 0".into()));
        }
        if !(1..=8).contains(&self.rules.decks) {
            return Err(EngineError::InvalidInput("rules.decks must be in [1, 8]".into()));
        }
        if !(0.5..=0.95).contains(&self.rules.penetration) {
            return Err(EngineError::InvalidInput("rules.penetration must be in [0.5, 0.95]".into()));
        }
        if self.rules.blackjack_payout <= 0.0 {
            return Err(EngineError::InvalidInput("rules.blackjackPayout must be > 0".into()));
        }
        if self.betting.min_bet <= 0.0 {
            return Err(EngineError::InvalidInput("betting.minBet must be > 0".into()));
        }
        if self.betting.entries.iter().any(|entry| entry.bet < 0.0) {
            return Err(EngineError::InvalidInput("betting.entries[*].bet must be >= 0".into()));
        }
        Ok(())
    }

    /// `max(1, floor(hoursToSimulate * handsPerHour))`.
    pub fn hands_per_reality(&self) -> u64 {
        let raw = (self.hours_to_simulate * self.hands_per_hour as f64).floor();
        if raw < 1.0 {
            1
        } else {
            raw as u64
        }
    }
}

/// Flat per-hand statistics and bankroll fate for one independent reality.
pub struct RealityOutcome {
    pub profits: Vec<f64>,
    pub wagers: Vec<f64>,
    pub ruined: bool,
    pub bust_hand_index: Option<u64>,
    pub starting_bankroll: f64,
    pub ending_bankroll: f64,
    pub debug_log: DebugLog,
}

/// Plays one full reality: `hands_per_reality()` hands (fewer if ruined),
/// honoring the cancellation cadence above. Returns `Ok(None)` when cancelled
/// partway through, so the caller can discard the reality.
pub fn run_reality(
    reality_index: u64,
    input: &SimulationInput,
    rng: &mut impl Rng,
    should_cancel: &(dyn Fn() -> bool + Sync),
) -> Result<Option<RealityOutcome>, EngineError> {
    let hands_per_reality = input.hands_per_reality();
    let round_rules = RoundRules {
        rules: &input.rules,
        deviations: &input.deviations,
        take_insurance: input.take_insurance,
    };

    let mut shoe = Shoe::new(&input.rules);
    shoe.reshuffle(rng);

    let mut profits = Vec::with_capacity(hands_per_reality as usize);
    let mut wagers = Vec::with_capacity(hands_per_reality as usize);
    let mut debug_log = DebugLog::new();
    let mut cumulative_profit = 0.0f64;
    let mut ruined = false;
    let mut bust_hand_index = None;

    for h in 0..hands_per_reality {
        if h % CANCEL_CHECK_INTERVAL == 0 && should_cancel() {
            return Ok(None);
        }

        let bankroll_now = input.bankroll + cumulative_profit;
        if bankroll_now <= 0.0 {
            ruined = true;
            bust_hand_index = Some(h);
            break;
        }

        shoe.prepare_for_new_hand(rng);
        let true_count = shoe.true_count();
        let wager = input.betting.wager_for(true_count).min(bankroll_now);
        if wager <= 0.0 {
            ruined = true;
            bust_hand_index = Some(h);
            break;
        }
        wagers.push(wager);

        let (profit, records) = hand_player::play_round(
            &mut shoe,
            rng,
            &round_rules,
            wager,
            bankroll_now,
            reality_index,
            h,
            input.debug,
        )?;
        profits.push(profit);
        cumulative_profit += profit;
        for record in records {
            debug_log.push(record);
        }

        if input.bankroll + cumulative_profit <= 0.0 {
            ruined = true;
            bust_hand_index = Some(h + 1);
            break;
        }
    }

    let ending_bankroll = (input.bankroll + cumulative_profit).max(0.0);

    Ok(Some(RealityOutcome {
        profits,
        wagers,
        ruined,
        bust_hand_index,
        starting_bankroll: input.bankroll,
        ending_bankroll,
        debug_log,
    }))
}
