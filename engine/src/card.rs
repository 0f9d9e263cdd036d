//! Cards and the Hi-Lo count tag.

/// A single card, represented by its rank in `1..=13` (1 = Ace, 11/12/13 = J/Q/K).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub rank: u8,
}

impl Card {
    pub fn new(rank: u8) -> Self {
        debug_assert!((1..=13).contains(&rank), "rank out of range: {rank}");
        Card { rank }
    }

    /// Blackjack value: 11 for an ace, 10 for face cards, else the rank itself.
    pub fn value(&self) -> u8 {
        match self.rank {
            1 => 11,
            11 | 12 | 13 => 10,
            r => r,
        }
    }

    /// Hi-Lo running-count tag: +1 for 2-6, 0 for 7-9, -1 for 10-A.
    pub fn hi_lo_tag(&self) -> i32 {
        match self.rank {
            2..=6 => 1,
            7..=9 => 0,
            _ => -1,
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 1
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self.rank {
            1 => "A".to_string(),
            10 => "T".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            r => r.to_string(),
        };
        write!(f, "{s}")
    }
}
