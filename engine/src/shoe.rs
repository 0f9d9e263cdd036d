//! Multi-deck shoe: shuffle, draw, running count, cut-card/penetration tracking.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::Card;
use crate::error::EngineError;
use crate::rules::Rules;

/// A shoe of `rules.decks * 52` cards dealt from the back of an internal vector.
#[derive(Debug, Clone)]
pub struct Shoe {
    decks: u8,
    penetration: f64,
    cards: Vec<Card>,
    /// Index of the next card to deal, counted from the front.
    cursor: usize,
    running_count: i32,
    cut_card_reached: bool,
}

impl Shoe {
    pub fn new(rules: &Rules) -> Self {
        let mut shoe = Shoe {
            decks: rules.decks,
            penetration: rules.penetration,
            cards: Vec::with_capacity(rules.decks as usize * 52),
            cursor: 0,
            running_count: 0,
            cut_card_reached: false,
        };
        shoe.reshuffle(&mut rand::thread_rng());
        shoe
    }

    fn deck_size(&self) -> usize {
        self.decks as usize * 52
    }

    /// Fills the shoe with `decks * 52` cards and shuffles uniformly at random.
    pub fn reshuffle(&mut self, rng: &mut impl Rng) {
        self.cards.clear();
        for _ in 0..self.decks {
            for rank in 1..=13u8 {
                self.cards.push(Card::new(rank));
            }
            for rank in 1..=13u8 {
                self.cards.push(Card::new(rank));
            }
            for rank in 1..=13u8 {
                self.cards.push(Card::new(rank));
            }
            for rank in 1..=13u8 {
                self.cards.push(Card::new(rank));
            }
        }
        self.cards.shuffle(rng);
        self.cursor = 0;
        self.running_count = 0;
        self.cut_card_reached = false;
    }

    fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    fn below_penetration_cutoff(&self) -> bool {
        (self.remaining() as f64) / (self.deck_size() as f64) < 1.0 - self.penetration
    }

    /// Reshuffles if the cut card was reached (or penetration already exceeded)
    /// since the last call. Must be invoked once before dealing each round.
    pub fn prepare_for_new_hand(&mut self, rng: &mut impl Rng) {
        if self.cut_card_reached || self.below_penetration_cutoff() {
            self.reshuffle(rng);
        }
    }

    /// Draws the next card, updating the running count and latching the
    /// cut-card flag. Reshuffles first if the shoe is unexpectedly empty
    /// (an edge case that should not occur under correct penetration).
    pub fn draw_card(&mut self, rng: &mut impl Rng) -> Result<Card, EngineError> {
        if self.cursor >= self.cards.len() {
            if self.cards.is_empty() {
                return Err(EngineError::Internal(
                    "shoe has zero capacity; cannot draw".into(),
                ));
            }
            self.reshuffle(rng);
        }
        let card = self.cards[self.cursor];
        self.cursor += 1;
        self.running_count += card.hi_lo_tag();
        if self.below_penetration_cutoff() {
            self.cut_card_reached = true;
        }
        Ok(card)
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// `runningCount / (shoeSize / 52)` where `shoeSize` is the number of cards
    /// still to be dealt; 0 when the shoe has been fully drawn down.
    pub fn true_count(&self) -> f64 {
        let shoe_size = self.remaining() as f64;
        if shoe_size == 0.0 {
            0.0
        } else {
            self.running_count as f64 / (shoe_size / 52.0)
        }
    }

    pub fn cut_card_reached(&self) -> bool {
        self.cut_card_reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use rand::SeedableRng;

    fn rules(decks: u8, penetration: f64) -> Rules {
        Rules {
            decks,
            penetration,
            ..Rules::default()
        }
    }

    #[test]
    fn reshuffle_produces_full_deck_counts() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let shoe = {
            let mut s = Shoe::new(&rules(2, 0.75));
            s.reshuffle(&mut rng);
            s
        };
        assert_eq!(shoe.cards.len(), 2 * 52);
        let mut counts = [0u32; 14];
        for c in &shoe.cards {
            counts[c.rank as usize] += 1;
        }
        for rank in 1..=13 {
            assert_eq!(counts[rank], 8, "rank {rank} should appear 8 times in a 2-deck shoe");
        }
    }

    #[test]
    fn running_count_matches_hi_lo_sum() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut shoe = Shoe::new(&rules(6, 0.75));
        shoe.reshuffle(&mut rng);
        let mut expected = 0i32;
        for _ in 0..40 {
            let card = shoe.draw_card(&mut rng).unwrap();
            expected += card.hi_lo_tag();
            assert_eq!(shoe.running_count(), expected);
        }
    }

    #[test]
    fn true_count_is_running_count_over_decks_remaining() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut shoe = Shoe::new(&rules(1, 0.75));
        shoe.reshuffle(&mut rng);
        // Draw roughly half a single-deck shoe so decks-remaining is well
        // short of decks-in-shoe, making the two formulas diverge sharply if
        // true_count were ever computed over the constant shoe size instead.
        for _ in 0..26 {
            shoe.draw_card(&mut rng).unwrap();
        }
        let remaining = shoe.remaining() as f64;
        assert!(remaining < shoe.deck_size() as f64, "test setup must draw down the shoe");
        assert_eq!(
            shoe.true_count(),
            shoe.running_count() as f64 / (remaining / 52.0)
        );
    }

    #[test]
    fn cut_card_latches_once_penetration_passed() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let mut shoe = Shoe::new(&rules(1, 0.5));
        shoe.reshuffle(&mut rng);
        assert!(!shoe.cut_card_reached());
        for _ in 0..27 {
            shoe.draw_card(&mut rng).unwrap();
        }
        assert!(shoe.cut_card_reached());
    }

    #[test]
    fn prepare_for_new_hand_reshuffles_after_cut_card() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(13);
        let mut shoe = Shoe::new(&rules(1, 0.5));
        shoe.reshuffle(&mut rng);
        for _ in 0..27 {
            shoe.draw_card(&mut rng).unwrap();
        }
        assert!(shoe.cut_card_reached());
        shoe.prepare_for_new_hand(&mut rng);
        assert!(!shoe.cut_card_reached());
        assert_eq!(shoe.running_count(), 0);
        assert_eq!(shoe.remaining(), 52);
    }
}
