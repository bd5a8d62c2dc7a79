use crate::model::bid::Call;
use crate::model::card::Card;
use crate::model::team::TeamId;
use crate::policy::{BidContext, PlayContext, Policy};
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerPosition {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl PlayerPosition {
    /// Seats in index order.
    pub const LOOP: [PlayerPosition; 4] = [
        PlayerPosition::North,
        PlayerPosition::East,
        PlayerPosition::South,
        PlayerPosition::West,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlayerPosition::North),
            1 => Some(PlayerPosition::East),
            2 => Some(PlayerPosition::South),
            3 => Some(PlayerPosition::West),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The seat that acts after this one (anticlockwise).
    pub const fn next(self) -> PlayerPosition {
        match self {
            PlayerPosition::North => PlayerPosition::West,
            PlayerPosition::West => PlayerPosition::South,
            PlayerPosition::South => PlayerPosition::East,
            PlayerPosition::East => PlayerPosition::North,
        }
    }

    pub const fn previous(self) -> PlayerPosition {
        match self {
            PlayerPosition::North => PlayerPosition::East,
            PlayerPosition::East => PlayerPosition::South,
            PlayerPosition::South => PlayerPosition::West,
            PlayerPosition::West => PlayerPosition::North,
        }
    }

    pub const fn partner(self) -> PlayerPosition {
        match self {
            PlayerPosition::North => PlayerPosition::South,
            PlayerPosition::East => PlayerPosition::West,
            PlayerPosition::South => PlayerPosition::North,
            PlayerPosition::West => PlayerPosition::East,
        }
    }

    pub const fn team(self) -> TeamId {
        match self {
            PlayerPosition::North | PlayerPosition::South => TeamId::NorthSouth,
            PlayerPosition::East | PlayerPosition::West => TeamId::EastWest,
        }
    }

    /// The four seats starting at `self` and following table order.
    pub fn rotation(self) -> [PlayerPosition; 4] {
        let mut seats = [self; 4];
        for idx in 1..4 {
            seats[idx] = seats[idx - 1].next();
        }
        seats
    }
}

impl fmt::Display for PlayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerPosition::North => "North",
            PlayerPosition::East => "East",
            PlayerPosition::South => "South",
            PlayerPosition::West => "West",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    /// Decisions come from the interaction collaborator handed to the round.
    Human,
    Autonomous,
}

enum Controller {
    Interactive,
    Autonomous(Box<dyn Policy>),
}

/// A seated participant. Hands are held by the round, keyed by position.
pub struct Player {
    name: String,
    position: PlayerPosition,
    controller: Controller,
}

impl Player {
    pub fn human(name: impl Into<String>, position: PlayerPosition) -> Self {
        Self {
            name: name.into(),
            position,
            controller: Controller::Interactive,
        }
    }

    pub fn autonomous(
        name: impl Into<String>,
        position: PlayerPosition,
        policy: Box<dyn Policy>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            controller: Controller::Autonomous(policy),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> PlayerPosition {
        self.position
    }

    pub fn team(&self) -> TeamId {
        self.position.team()
    }

    pub fn kind(&self) -> PlayerKind {
        match self.controller {
            Controller::Interactive => PlayerKind::Human,
            Controller::Autonomous(_) => PlayerKind::Autonomous,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind(), PlayerKind::Human)
    }

    /// Asks whoever controls this seat for a call. `None` means nobody answered.
    pub fn decide_bid(
        &mut self,
        ctx: &BidContext<'_>,
        interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Option<Call> {
        match (&mut self.controller, interaction) {
            (Controller::Interactive, Some(view)) => Some(view.choose_bid(ctx)),
            (Controller::Interactive, None) => None,
            (Controller::Autonomous(policy), _) => Some(policy.choose_bid(ctx)),
        }
    }

    /// Asks whoever controls this seat for a card. `None` means nobody answered.
    pub fn decide_card(
        &mut self,
        ctx: &PlayContext<'_>,
        interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Option<Card> {
        match (&mut self.controller, interaction) {
            (Controller::Interactive, Some(view)) => Some(view.choose_card(ctx)),
            (Controller::Interactive, None) => None,
            (Controller::Autonomous(policy), _) => Some(policy.choose_card(ctx)),
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("kind", &self.kind())
            .finish()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.position)
    }
}
