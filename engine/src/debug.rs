//! Bounded per-hand decision trace and its CSV export.

use crate::card::Card;
use crate::strategy::Action;

pub const MAX_DEBUG_RECORDS: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsuranceDecision {
    Taken,
    Declined,
    /// Eligible (split depth 0, dealer shows an ace) but `takeInsurance` is off.
    Disabled,
    /// Not eligible: split depth > 0, or the dealer upcard is not an ace.
    Ineligible,
}

impl InsuranceDecision {
    fn as_csv_str(&self) -> &'static str {
        match self {
            InsuranceDecision::Taken => "taken",
            InsuranceDecision::Declined => "declined",
            InsuranceDecision::Disabled => "disabled",
            InsuranceDecision::Ineligible => "ineligible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsuranceResult {
    Won,
    Lost,
}

/// `Win`/`Loss`/`Push` is always derived from the sign of the hand's profit:
/// this field is cosmetic for the debug log, not an independently-tracked
/// outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl Outcome {
    pub fn from_profit(profit: f64) -> Self {
        if profit > 0.0 {
            Outcome::Win
        } else if profit < 0.0 {
            Outcome::Loss
        } else {
            Outcome::Push
        }
    }

    fn as_csv_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Push => "push",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebugRecord {
    pub reality: u64,
    pub hand_index: u64,
    pub split_depth: u8,
    pub true_count: f64,
    pub player_initial_cards: Vec<Card>,
    pub dealer_up: Card,
    pub dealer_hole: Card,
    pub action_trace: Vec<Action>,
    pub wager: f64,
    pub insurance_bet: f64,
    pub insurance_decision: InsuranceDecision,
    pub insurance_result: Option<InsuranceResult>,
    pub insurance_net: Option<f64>,
    pub bankroll_start: f64,
    pub payout: f64,
    pub bankroll_end: f64,
    pub player_final_cards: Vec<Card>,
    pub player_final_total: u16,
    pub player_final_is_soft: bool,
    pub dealer_final_cards: Vec<Card>,
}

impl DebugRecord {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_profit(self.payout)
    }

    fn action_str(&self) -> String {
        self.action_trace
            .iter()
            .map(|a| match a {
                Action::Hit => "H",
                Action::Stand => "S",
                Action::Double => "D",
                Action::Split => "P",
                Action::Surrender => "R",
            })
            .collect::<Vec<_>>()
            .join("-")
    }

    fn cards_str(cards: &[Card]) -> String {
        cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
    }

    /// Renders this record as one row in `CSV_HEADER`'s column order, with
    /// absent insurance result/net fields as the literal `null`.
    pub fn to_csv_row(&self) -> Vec<String> {
        vec![
            self.reality.to_string(),
            self.hand_index.to_string(),
            self.split_depth.to_string(),
            format!("{:.4}", self.true_count),
            Self::cards_str(&self.player_initial_cards),
            self.dealer_up.to_string(),
            self.dealer_hole.to_string(),
            self.player_final_total.to_string(),
            self.player_final_is_soft.to_string(),
            self.action_str(),
            format!("{:.2}", self.wager),
            format!("{:.2}", self.insurance_bet),
            self.insurance_decision.as_csv_str().to_string(),
            self.insurance_result
                .map(|r| match r {
                    InsuranceResult::Won => "won".to_string(),
                    InsuranceResult::Lost => "lost".to_string(),
                })
                .unwrap_or_else(|| "null".to_string()),
            self.insurance_net
                .map(|n| format!("{n:.2}"))
                .unwrap_or_else(|| "null".to_string()),
            format!("{:.2}", self.bankroll_start),
            format!("{:.2}", self.payout),
            format!("{:.2}", self.bankroll_end),
            self.outcome().as_csv_str().to_string(),
            Self::cards_str(&self.player_final_cards),
            Self::cards_str(&self.dealer_final_cards),
        ]
    }
}

pub const CSV_HEADER: [&str; 21] = [
    "reality",
    "handIndex",
    "splitDepth",
    "trueCount",
    "playerCards",
    "dealerUp",
    "dealerHole",
    "total",
    "isSoft",
    "action",
    "wager",
    "insuranceBet",
    "insuranceDecision",
    "insuranceResult",
    "insuranceNet",
    "bankrollStart",
    "payout",
    "bankrollEnd",
    "result",
    "playerFinal",
    "dealerFinal",
];

/// Append-only per-run debug buffer, hard-capped at `MAX_DEBUG_RECORDS`.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    records: Vec<DebugRecord>,
}

impl DebugLog {
    pub fn new() -> Self {
        DebugLog::default()
    }

    pub fn push(&mut self, record: DebugRecord) {
        if self.records.len() < MAX_DEBUG_RECORDS {
            self.records.push(record);
        }
    }

    pub fn records(&self) -> &[DebugRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merges worker-local logs (one per parallel reality) into a single
    /// capped log, preserving reality order. Returns how many records were
    /// dropped by the cap, so the caller can log a truncation notice.
    pub fn merge_capped(logs: Vec<DebugLog>) -> (DebugLog, usize) {
        let mut merged = DebugLog::new();
        let mut dropped = 0usize;
        for log in logs {
            for record in log.records {
                if merged.records.len() < MAX_DEBUG_RECORDS {
                    merged.records.push(record);
                } else {
                    dropped += 1;
                }
            }
        }
        (merged, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(payout: f64) -> DebugRecord {
        DebugRecord {
            reality: 0,
            hand_index: 0,
            split_depth: 0,
            true_count: 1.5,
            player_initial_cards: vec![Card::new(10), Card::new(6)],
            dealer_up: Card::new(10),
            dealer_hole: Card::new(7),
            action_trace: vec![Action::Hit, Action::Stand],
            wager: 10.0,
            insurance_bet: 0.0,
            insurance_decision: InsuranceDecision::Ineligible,
            insurance_result: None,
            insurance_net: None,
            bankroll_start: 1000.0,
            payout,
            bankroll_end: 1000.0 + payout,
            player_final_cards: vec![Card::new(10), Card::new(6), Card::new(3)],
            player_final_total: 19,
            player_final_is_soft: false,
            dealer_final_cards: vec![Card::new(10), Card::new(7)],
        }
    }

    #[test]
    fn outcome_follows_sign_of_profit() {
        assert_eq!(sample_record(10.0).outcome(), Outcome::Win);
        assert_eq!(sample_record(-10.0).outcome(), Outcome::Loss);
        assert_eq!(sample_record(0.0).outcome(), Outcome::Push);
    }

    #[test]
    fn csv_row_renders_absent_insurance_fields_as_null() {
        let row = sample_record(5.0).to_csv_row();
        assert_eq!(row.len(), CSV_HEADER.len());
        let insurance_result_idx = CSV_HEADER.iter().position(|h| *h == "insuranceResult").unwrap();
        let insurance_net_idx = CSV_HEADER.iter().position(|h| *h == "insuranceNet").unwrap();
        assert_eq!(row[insurance_result_idx], "null");
        assert_eq!(row[insurance_net_idx], "null");
    }

    #[test]
    fn log_is_capped_at_max_records() {
        let mut log = DebugLog::new();
        for _ in 0..(MAX_DEBUG_RECORDS + 10) {
            log.push(sample_record(1.0));
        }
        assert_eq!(log.len(), MAX_DEBUG_RECORDS);
    }

    #[test]
    fn merge_capped_reports_dropped_count() {
        let mut a = DebugLog::new();
        let mut b = DebugLog::new();
        for _ in 0..MAX_DEBUG_RECORDS {
            a.push(sample_record(1.0));
        }
        for _ in 0..5 {
            b.push(sample_record(1.0));
        }
        let (merged, dropped) = DebugLog::merge_capped(vec![a, b]);
        assert_eq!(merged.len(), MAX_DEBUG_RECORDS);
        assert_eq!(dropped, 5);
    }
}
