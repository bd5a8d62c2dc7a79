use crate::error::ContreeError;
use crate::model::bid::{Bid, BidError};
use crate::model::contract::Contract;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::player::{Player, PlayerPosition};
use crate::model::round::{PlayError, RoundState};
use crate::model::score::RoundScore;
use crate::model::team::{Team, TeamId};
use crate::policy::Policy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Setup(#[from] ContreeError),
    #[error(transparent)]
    Bidding(#[from] BidError),
    #[error(transparent)]
    Play(#[from] PlayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOver {
    InProgress,
    Winner(TeamId),
    /// Several teams share the top score at or above the target.
    Tie(Vec<TeamId>),
}

impl GameOver {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOver::InProgress)
    }
}

/// Record of one finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub dealer: PlayerPosition,
    pub bids: Vec<Bid>,
    pub contract: Option<Contract>,
    pub score: RoundScore,
    /// Running team totals after this round.
    pub totals: [u32; 2],
}

impl RoundSummary {
    pub fn is_redeal(&self) -> bool {
        self.contract.is_none()
    }
}

#[derive(Debug)]
pub struct GameState {
    players: [Player; 4],
    teams: [Team; 2],
    deck: Deck,
    dealer: Option<PlayerPosition>,
    round_number: u32,
    current_round: Option<RoundState>,
    history: Vec<RoundSummary>,
    rng: StdRng,
    seed: u64,
}

impl GameState {
    pub fn new(players: Vec<Player>) -> Result<Self, ContreeError> {
        Self::with_seed(players, rand::random())
    }

    /// Seats exactly one player at each position; North-South play East-West.
    pub fn with_seed(mut players: Vec<Player>, seed: u64) -> Result<Self, ContreeError> {
        if players.len() != 4 {
            return Err(ContreeError::player_count(4, players.len(), "creating game"));
        }
        players.sort_by_key(|player| player.position().index());
        for (seat, player) in PlayerPosition::LOOP.iter().zip(&players) {
            if player.position() != *seat {
                return Err(ContreeError::InvalidPosition {
                    position: *seat,
                    context: "creating game",
                });
            }
        }
        let players: [Player; 4] = players
            .try_into()
            .map_err(|rest: Vec<Player>| ContreeError::player_count(4, rest.len(), "creating game"))?;

        Ok(Self {
            players,
            teams: TeamId::ALL.map(Team::for_id),
            deck: Deck::standard(),
            dealer: None,
            round_number: 0,
            current_round: None,
            history: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn player(&self, seat: PlayerPosition) -> &Player {
        &self.players[seat.index()]
    }

    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub fn scores(&self) -> [u32; 2] {
        self.teams.each_ref().map(Team::total_score)
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn dealer(&self) -> Option<PlayerPosition> {
        self.dealer
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn current_round(&self) -> Option<&RoundState> {
        self.current_round.as_ref()
    }

    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    /// Moves the dealer button: a random seat for the first round, then the
    /// next seat anticlockwise.
    pub fn next_dealer(&mut self) -> PlayerPosition {
        let dealer = match self.dealer {
            None => PlayerPosition::LOOP[self.rng.gen_range(0..PlayerPosition::LOOP.len())],
            Some(previous) => previous.next(),
        };
        self.dealer = Some(dealer);
        dealer
    }

    /// Bidding and play order for the current dealer, dealer last.
    pub fn players_order(&self) -> Option<[PlayerPosition; 4]> {
        self.dealer.map(|dealer| dealer.next().rotation())
    }

    /// Rotates the dealer and deals a fresh round. The first round shuffles;
    /// later rounds only cut the cards gathered from the previous one.
    pub fn start_new_round(&mut self) -> Result<&mut RoundState, ContreeError> {
        if let Some(mut finished) = self.current_round.take() {
            self.deck = finished.take_deck();
        }
        if self.deck.len() != DECK_SIZE {
            tracing::warn!(
                target: "contree_core::play",
                cards = self.deck.len(),
                "deck incomplete, starting from a fresh pack"
            );
            self.deck.reset();
            self.deck.shuffle_in_place(&mut self.rng);
        }

        self.round_number += 1;
        let dealer = self.next_dealer();
        if self.round_number == 1 {
            self.deck.shuffle_in_place(&mut self.rng);
        } else {
            self.deck.cut(&mut self.rng);
        }

        let deck = std::mem::take(&mut self.deck);
        let round = RoundState::deal(self.round_number, dealer, deck)?;
        Ok(self.current_round.insert(round))
    }

    /// Plays one full round: deal, auction, tricks and scoring.
    pub fn play_round(
        &mut self,
        mut interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Result<RoundSummary, GameError> {
        self.start_new_round()?;
        let Some(round) = self.current_round.as_mut() else {
            return Err(PlayError::NotInPlayPhase.into());
        };

        let contract = round.manage_bidding(&mut self.players, interaction.as_deref_mut())?;
        if contract.is_some() {
            round.play_all_tricks(&mut self.players, interaction.as_deref_mut())?;
        }
        let score = round.calculate_round_scores()?;
        for team in &mut self.teams {
            team.add_points(score.score(team.id()));
        }

        let summary = RoundSummary {
            round_number: round.round_number(),
            dealer: round.dealer(),
            bids: round.bids().to_vec(),
            contract,
            score,
            totals: self.teams.each_ref().map(Team::total_score),
        };
        tracing::info!(
            target: "contree_core::scoring",
            round = summary.round_number,
            ns_total = summary.totals[TeamId::NorthSouth.index()],
            ew_total = summary.totals[TeamId::EastWest.index()],
            redeal = summary.is_redeal(),
            "round complete"
        );
        self.history.push(summary.clone());
        Ok(summary)
    }

    /// Whether some team reached `target_score`, and who leads if so.
    pub fn check_game_over(&self, target_score: u32) -> GameOver {
        let best = self
            .teams
            .iter()
            .map(Team::total_score)
            .max()
            .unwrap_or(0);
        if best < target_score {
            return GameOver::InProgress;
        }
        let mut leaders: Vec<TeamId> = self
            .teams
            .iter()
            .filter(|team| team.total_score() == best)
            .map(Team::id)
            .collect();
        if leaders.len() == 1 {
            GameOver::Winner(leaders.remove(0))
        } else {
            GameOver::Tie(leaders)
        }
    }

    /// Plays rounds until a team reaches `target_score` or `max_rounds`
    /// rounds (redeals included) have been dealt.
    pub fn play_game(
        &mut self,
        target_score: u32,
        max_rounds: u32,
        mut interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Result<GameOver, GameError> {
        loop {
            let status = self.check_game_over(target_score);
            if status.is_over() || self.round_number >= max_rounds {
                return Ok(status);
            }
            self.play_round(interaction.as_deref_mut())?;
        }
    }
}
