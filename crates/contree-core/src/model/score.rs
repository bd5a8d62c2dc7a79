use crate::model::contract::Contract;
use crate::model::player::PlayerPosition;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::model::team::TeamId;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};

pub const TRICKS_PER_ROUND: usize = 8;
/// Card points of one round including the last-trick bonus.
pub const TOTAL_ROUND_POINTS: u32 = 162;
pub const LAST_TRICK_BONUS: u32 = 10;
pub const BELOTE_BONUS: u32 = 20;
pub const CAPOT_BASE_POINTS: u32 = 250;
pub const CAPOT_THRESHOLD: u32 = TOTAL_ROUND_POINTS;
/// Fixed part of doubled and failed contract scores.
pub const SCORING_BASE: u32 = 160;
pub const DEFAULT_TARGET_SCORE: u32 = 1500;

/// Breakdown of one round, indexed by [`TeamId::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundScore {
    /// Card points of the tricks each team won.
    pub card_points: [u32; 2],
    pub belote: Option<TeamId>,
    pub last_trick: Option<TeamId>,
    /// Card points plus bonuses.
    pub team_points: [u32; 2],
    /// `None` when the round was redealt.
    pub contract_made: Option<bool>,
    /// Points added to each team's running total.
    pub scores: [u32; 2],
}

impl RoundScore {
    pub fn redeal() -> Self {
        Self::default()
    }

    pub fn score(&self, team: TeamId) -> u32 {
        self.scores[team.index()]
    }

    pub fn team_points(&self, team: TeamId) -> u32 {
        self.team_points[team.index()]
    }
}

/// Scores a played-out round against its contract.
pub fn score_round(contract: &Contract, tricks: &[Trick]) -> RoundScore {
    let trump = contract.trump();
    let mut card_points = [0u32; 2];
    let mut last_trick = None;
    for trick in tricks {
        if let Some(winner) = trick.winner() {
            card_points[winner.team().index()] += trick.points();
            last_trick = Some(winner.team());
        }
    }

    let belote = trump.and_then(|suit| belote_team(tricks, suit));
    let mut team_points = card_points;
    if let Some(team) = belote {
        team_points[team.index()] += BELOTE_BONUS;
    }
    if let Some(team) = last_trick {
        team_points[team.index()] += LAST_TRICK_BONUS;
    }

    let attackers = contract.team();
    let defenders = attackers.opponent();
    let made = contract.is_made(team_points[attackers.index()]);
    let mut scores = [0u32; 2];
    if made {
        scores[attackers.index()] = contract.success_points(team_points[attackers.index()]);
        scores[defenders.index()] = team_points[defenders.index()];
    } else {
        scores[defenders.index()] = contract.failure_points();
    }

    tracing::info!(
        target: "contree_core::scoring",
        contract = %contract,
        made,
        ns_points = team_points[TeamId::NorthSouth.index()],
        ew_points = team_points[TeamId::EastWest.index()],
        ns_score = scores[TeamId::NorthSouth.index()],
        ew_score = scores[TeamId::EastWest.index()],
        "round scored"
    );

    RoundScore {
        card_points,
        belote,
        last_trick,
        team_points,
        contract_made: Some(made),
        scores,
    }
}

/// The team that played both the King and the Queen of trump, if one did.
pub fn belote_team(tricks: &[Trick], trump: Suit) -> Option<TeamId> {
    let played_by = |rank: Rank| -> Option<PlayerPosition> {
        tricks
            .iter()
            .flat_map(|trick| trick.plays().iter())
            .find(|play| play.card.rank == rank && play.card.suit == trump)
            .map(|play| play.position)
    };
    let king = played_by(Rank::King)?;
    let queen = played_by(Rank::Queen)?;
    (king.team() == queen.team()).then(|| king.team())
}
