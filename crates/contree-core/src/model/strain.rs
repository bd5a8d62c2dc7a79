use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Denomination of a contract: a trump suit or no trump at all.
///
/// A flat enum rather than `Option<Suit>` so that bids print and serialize
/// with the no-trump case named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strain {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
    NoTrump,
}

impl Strain {
    pub const ALL: [Strain; 5] = [
        Strain::Spades,
        Strain::Hearts,
        Strain::Diamonds,
        Strain::Clubs,
        Strain::NoTrump,
    ];

    /// The suit elevated by this strain; `None` for no trump, where every
    /// suit uses the normal tables.
    pub const fn trump(self) -> Option<Suit> {
        match self {
            Strain::Spades => Some(Suit::Spades),
            Strain::Hearts => Some(Suit::Hearts),
            Strain::Diamonds => Some(Suit::Diamonds),
            Strain::Clubs => Some(Suit::Clubs),
            Strain::NoTrump => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Strain::Spades => "Spades",
            Strain::Hearts => "Hearts",
            Strain::Diamonds => "Diamonds",
            Strain::Clubs => "Clubs",
            Strain::NoTrump => "NoTrump",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        Strain::ALL
            .into_iter()
            .find(|strain| strain.name().eq_ignore_ascii_case(value.trim()))
    }
}

impl From<Suit> for Strain {
    fn from(suit: Suit) -> Self {
        match suit {
            Suit::Spades => Strain::Spades,
            Suit::Hearts => Strain::Hearts,
            Suit::Diamonds => Strain::Diamonds,
            Suit::Clubs => Strain::Clubs,
        }
    }
}

/// Error raised when converting [`Strain::NoTrump`] to a suit
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("NoTrump is not a suit")]
pub struct SuitFromNoTrumpError;

impl TryFrom<Strain> for Suit {
    type Error = SuitFromNoTrumpError;

    fn try_from(strain: Strain) -> Result<Self, Self::Error> {
        strain.trump().ok_or(SuitFromNoTrumpError)
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{Strain, SuitFromNoTrumpError};
    use crate::model::suit::Suit;

    #[test]
    fn suits_convert_both_ways() {
        for suit in Suit::ALL {
            let strain = Strain::from(suit);
            assert_eq!(Suit::try_from(strain), Ok(suit));
            assert_eq!(strain.trump(), Some(suit));
        }
        assert_eq!(Suit::try_from(Strain::NoTrump), Err(SuitFromNoTrumpError));
        assert_eq!(Strain::NoTrump.trump(), None);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Strain::from_name("hearts"), Some(Strain::Hearts));
        assert_eq!(Strain::from_name("NoTrump"), Some(Strain::NoTrump));
        assert_eq!(Strain::from_name("Stars"), None);
    }
}
