use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Whether this card belongs to the trump suit. Always false without trump.
    pub fn is_trump(self, trump: Option<Suit>) -> bool {
        trump == Some(self.suit)
    }

    pub fn points(self, trump: Option<Suit>) -> u32 {
        if self.is_trump(trump) {
            self.rank.trump_points()
        } else {
            self.rank.normal_points()
        }
    }

    pub fn order(self, trump: Option<Suit>) -> u8 {
        if self.is_trump(trump) {
            self.rank.trump_order()
        } else {
            self.rank.normal_order()
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
