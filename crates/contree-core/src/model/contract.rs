use crate::model::bid::{ContractBid, ContractValue};
use crate::model::player::PlayerPosition;
use crate::model::score::{CAPOT_THRESHOLD, SCORING_BASE};
use crate::model::strain::Strain;
use crate::model::suit::Suit;
use crate::model::team::TeamId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// The winning bid of an auction with its escalation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    bid: ContractBid,
    player: PlayerPosition,
    doubled: bool,
    redoubled: bool,
}

impl Contract {
    pub const fn new(
        bid: ContractBid,
        player: PlayerPosition,
        doubled: bool,
        redoubled: bool,
    ) -> Self {
        Self {
            bid,
            player,
            doubled,
            redoubled,
        }
    }

    pub fn bid(&self) -> ContractBid {
        self.bid
    }

    pub fn value(&self) -> ContractValue {
        self.bid.value
    }

    pub fn strain(&self) -> Strain {
        self.bid.strain
    }

    pub fn trump(&self) -> Option<Suit> {
        self.bid.strain.trump()
    }

    pub fn player(&self) -> PlayerPosition {
        self.player
    }

    pub fn team(&self) -> TeamId {
        self.player.team()
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn is_redoubled(&self) -> bool {
        self.redoubled
    }

    pub fn multiplier(&self) -> u32 {
        if self.redoubled {
            4
        } else if self.doubled {
            2
        } else {
            1
        }
    }

    pub fn base_points(&self) -> u32 {
        self.bid.base_points()
    }

    /// A capot needs every point of the round; other contracts need their value.
    pub fn is_made(&self, team_points: u32) -> bool {
        match self.bid.value {
            ContractValue::AllTricks => team_points >= CAPOT_THRESHOLD,
            ContractValue::Points(value) => team_points >= u32::from(value),
        }
    }

    /// Score of the contracting team when the contract is made.
    pub fn success_points(&self, team_points: u32) -> u32 {
        if self.doubled || self.redoubled {
            SCORING_BASE + self.base_points() * self.multiplier()
        } else {
            self.base_points() + team_points
        }
    }

    /// Score of the defending team when the contract fails.
    pub fn failure_points(&self) -> u32 {
        (SCORING_BASE + self.base_points()) * self.multiplier()
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.bid, self.player)?;
        if self.redoubled {
            f.write_str(" (redoubled)")
        } else if self.doubled {
            f.write_str(" (doubled)")
        } else {
            Ok(())
        }
    }
}
