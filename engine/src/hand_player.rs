//! Single-round hand resolution: deal, insurance, dealer peek, the recursive
//! split tree, the dealer's own draw, and final settlement.
//!
//! Modeled as a tree of pure functions returning net profit rather than as
//! mutation of shared state: the only thing threaded through for its own
//! sake is a running bankroll figure used purely to stamp debug records.
//! Insurance is resolved once, at the top of the tree; nested split
//! recursions never see it.

use rand::Rng;

use crate::card::Card;
use crate::debug::{DebugRecord, InsuranceDecision, InsuranceResult};
use crate::deviation::{self, DeviationRule};
use crate::error::EngineError;
use crate::hand::Hand;
use crate::rules::Rules;
use crate::shoe::Shoe;
use crate::strategy::{self, Action};

/// Splitting stops once a hand's split depth reaches this bound; from then
/// on a splittable pair is simply played as an ordinary two-card hand.
pub const MAX_SPLIT_DEPTH: u8 = 3;

pub struct RoundRules<'a> {
    pub rules: &'a Rules,
    pub deviations: &'a [DeviationRule],
    pub take_insurance: bool,
}

/// One terminal hand produced by the split tree: either already settled
/// (bust, surrender) or still awaiting comparison against the dealer's
/// fully-played hand.
struct Leaf {
    hand: Hand,
    wager: f64,
    depth: u8,
    action_trace: Vec<Action>,
    predetermined_profit: Option<f64>,
}

/// Plays one full round for a single reality/hand slot and returns the net
/// profit together with any debug records produced (empty when `debug_enabled`
/// is false).
#[allow(clippy::too_many_arguments)]
pub fn play_round(
    shoe: &mut Shoe,
    rng: &mut impl Rng,
    round: &RoundRules,
    wager: f64,
    bankroll_before: f64,
    reality: u64,
    hand_index: u64,
    debug_enabled: bool,
) -> Result<(f64, Vec<DebugRecord>), EngineError> {
    let mut player = Hand::new();
    player.push(shoe.draw_card(rng)?);
    player.push(shoe.draw_card(rng)?);
    let dealer_up = shoe.draw_card(rng)?;
    let dealer_hole = shoe.draw_card(rng)?;
    let mut dealer = Hand::new();
    dealer.push(dealer_up);
    dealer.push(dealer_hole);

    let true_count_at_deal = shoe.true_count();

    let insurance_eligible = dealer_up.is_ace();
    let insurance_decision = if !insurance_eligible {
        InsuranceDecision::Ineligible
    } else if !round.take_insurance {
        InsuranceDecision::Disabled
    } else if true_count_at_deal >= 3.0 {
        InsuranceDecision::Taken
    } else {
        InsuranceDecision::Declined
    };
    let insurance_bet = if insurance_decision == InsuranceDecision::Taken {
        wager / 2.0
    } else {
        0.0
    };

    let dealer_natural = dealer.is_blackjack();
    let (insurance_result, insurance_net) = if insurance_bet > 0.0 {
        if dealer_natural {
            (Some(InsuranceResult::Won), Some(insurance_bet * 2.0))
        } else {
            (Some(InsuranceResult::Lost), Some(-insurance_bet))
        }
    } else {
        (None, None)
    };

    let mut records = Vec::new();

    if dealer_natural {
        let main_profit = if player.is_blackjack() && !player.from_split {
            0.0
        } else {
            -wager
        };
        let total_profit = main_profit + insurance_net.unwrap_or(0.0);
        if debug_enabled {
            records.push(DebugRecord {
                reality,
                hand_index,
                split_depth: 0,
                true_count: true_count_at_deal,
                player_initial_cards: player.cards().to_vec(),
                dealer_up,
                dealer_hole,
                action_trace: Vec::new(),
                wager,
                insurance_bet,
                insurance_decision,
                insurance_result,
                insurance_net,
                bankroll_start: bankroll_before,
                payout: total_profit,
                bankroll_end: bankroll_before + total_profit,
                player_final_cards: player.cards().to_vec(),
                player_final_total: player.best_value(),
                player_final_is_soft: player.is_soft(),
                dealer_final_cards: dealer.cards().to_vec(),
            });
        }
        return Ok((total_profit, records));
    }

    let player_initial_cards = player.cards().to_vec();
    let leaves = play_position(player, 0, wager, dealer_up, shoe, rng, round.rules, round.deviations)?;

    let any_needs_dealer = leaves.iter().any(|leaf| leaf.predetermined_profit.is_none());
    let dealer = if any_needs_dealer {
        play_dealer(dealer, shoe, rng, round.rules)?
    } else {
        dealer
    };

    let mut total_profit = insurance_net.unwrap_or(0.0);
    let mut running_bankroll = bankroll_before;
    for (i, leaf) in leaves.into_iter().enumerate() {
        let profit = leaf
            .predetermined_profit
            .unwrap_or_else(|| settle_vs_dealer(&leaf.hand, leaf.wager, &dealer, round.rules));
        total_profit += profit;
        if debug_enabled {
            let (ins_bet, ins_decision, ins_result, ins_net) = if i == 0 {
                (insurance_bet, insurance_decision, insurance_result, insurance_net)
            } else {
                (0.0, InsuranceDecision::Ineligible, None, None)
            };
            records.push(DebugRecord {
                reality,
                hand_index,
                split_depth: leaf.depth,
                true_count: true_count_at_deal,
                player_initial_cards: player_initial_cards.clone(),
                dealer_up,
                dealer_hole,
                action_trace: leaf.action_trace,
                wager: leaf.wager,
                insurance_bet: ins_bet,
                insurance_decision: ins_decision,
                insurance_result: ins_result,
                insurance_net: ins_net,
                bankroll_start: running_bankroll,
                payout: profit,
                bankroll_end: running_bankroll + profit,
                player_final_cards: leaf.hand.cards().to_vec(),
                player_final_total: leaf.hand.best_value(),
                player_final_is_soft: leaf.hand.is_soft(),
                dealer_final_cards: dealer.cards().to_vec(),
            });
        }
        running_bankroll += profit;
    }

    Ok((total_profit, records))
}

fn decide(
    hand: &Hand,
    dealer_up: Card,
    shoe: &Shoe,
    rules: &Rules,
    deviations: &[DeviationRule],
) -> Action {
    let running_count = shoe.running_count();
    let true_count = shoe.true_count();
    let base = strategy::base_action(hand, dealer_up, rules);
    deviation::apply(base, hand, dealer_up, running_count, true_count, rules, deviations)
}

fn play_position(
    mut hand: Hand,
    depth: u8,
    wager: f64,
    dealer_up: Card,
    shoe: &mut Shoe,
    rng: &mut impl Rng,
    rules: &Rules,
    deviations: &[DeviationRule],
) -> Result<Vec<Leaf>, EngineError> {
    let mut decision = decide(&hand, dealer_up, &*shoe, rules, deviations);
    let split_feasible = depth < MAX_SPLIT_DEPTH && hand.can_split() && !hand.is_split_ace;
    if decision == Action::Split && !split_feasible {
        let fallback = strategy::total_only_action(&hand, dealer_up.value());
        decision = deviation::apply(
            fallback,
            &hand,
            dealer_up,
            shoe.running_count(),
            shoe.true_count(),
            rules,
            deviations,
        );
        if decision == Action::Double && hand.from_split && !rules.double_after_split {
            decision = Action::Hit;
        }
        if decision == Action::Split {
            decision = Action::Hit;
        }
    }

    match decision {
        Action::Surrender => Ok(vec![Leaf {
            hand,
            wager,
            depth,
            action_trace: vec![Action::Surrender],
            predetermined_profit: Some(-wager / 2.0),
        }]),
        Action::Split if split_feasible => {
            let pair_rank = hand
                .pair_rank()
                .ok_or_else(|| EngineError::Internal("split decision on unsplittable hand".into()))?;
            let is_ace_pair = pair_rank == 1;
            let cards = hand.cards().to_vec();

            let card0 = shoe.draw_card(rng)?;
            let card1 = shoe.draw_card(rng)?;

            let mut half0 = Hand::new();
            half0.push(cards[0]);
            half0.push(card0);
            half0.from_split = true;
            half0.is_split_ace = is_ace_pair;

            let mut half1 = Hand::new();
            half1.push(cards[1]);
            half1.push(card1);
            half1.from_split = true;
            half1.is_split_ace = is_ace_pair;

            let mut leaves = Vec::new();
            if is_ace_pair {
                for half in [half0, half1] {
                    leaves.push(Leaf {
                        hand: half,
                        wager,
                        depth: depth + 1,
                        action_trace: Vec::new(),
                        predetermined_profit: None,
                    });
                }
            } else {
                leaves.extend(play_position(half0, depth + 1, wager, dealer_up, shoe, rng, rules, deviations)?);
                leaves.extend(play_position(half1, depth + 1, wager, dealer_up, shoe, rng, rules, deviations)?);
            }
            Ok(leaves)
        }
        Action::Double if hand.len() == 2 => {
            let card = shoe.draw_card(rng)?;
            hand.push(card);
            let doubled_wager = wager * 2.0;
            let predetermined = if hand.is_busted() { Some(-doubled_wager) } else { None };
            Ok(vec![Leaf {
                hand,
                wager: doubled_wager,
                depth,
                action_trace: vec![Action::Double],
                predetermined_profit: predetermined,
            }])
        }
        _ => {
            let mut trace = Vec::new();
            loop {
                let mut action = decide(&hand, dealer_up, &*shoe, rules, deviations);
                if hand.len() > 2 && action == Action::Double {
                    action = Action::Hit;
                }
                match action {
                    Action::Hit => {
                        trace.push(Action::Hit);
                        let card = shoe.draw_card(rng)?;
                        hand.push(card);
                        if hand.is_busted() {
                            return Ok(vec![Leaf {
                                hand,
                                wager,
                                depth,
                                action_trace: trace,
                                predetermined_profit: Some(-wager),
                            }]);
                        }
                    }
                    // A freshly-grown hand (len > 2) can no longer satisfy the
                    // two-card preconditions for Surrender/Double/Split, so any
                    // non-Hit/Stand result here only arises on the loop's first
                    // pass, where it is already Stand by construction.
                    Action::Stand | Action::Surrender | Action::Split => {
                        trace.push(Action::Stand);
                        return Ok(vec![Leaf {
                            hand,
                            wager,
                            depth,
                            action_trace: trace,
                            predetermined_profit: None,
                        }]);
                    }
                    Action::Double => unreachable!("downgraded to Hit above"),
                }
            }
        }
    }
}

fn play_dealer(mut dealer: Hand, shoe: &mut Shoe, rng: &mut impl Rng, rules: &Rules) -> Result<Hand, EngineError> {
    loop {
        let total = dealer.best_value();
        if total < 17 || (total == 17 && dealer.is_soft() && rules.dealer_hits_soft_17) {
            dealer.push(shoe.draw_card(rng)?);
        } else {
            break;
        }
    }
    Ok(dealer)
}

fn settle_vs_dealer(hand: &Hand, wager: f64, dealer: &Hand, rules: &Rules) -> f64 {
    debug_assert!(!dealer.is_blackjack(), "dealer natural must short-circuit before settlement");
    if hand.is_blackjack() && !hand.from_split {
        wager * rules.blackjack_payout
    } else if dealer.is_busted() {
        wager
    } else {
        let player_total = hand.best_value();
        let dealer_total = dealer.best_value();
        if player_total > dealer_total {
            wager
        } else if player_total < dealer_total {
            -wager
        } else {
            0.0
        }
    }
}
