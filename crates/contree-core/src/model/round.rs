use crate::error::ContreeError;
use crate::model::bid::{Auction, AuctionOutcome, Bid, BidError, Call};
use crate::model::card::Card;
use crate::model::contract::Contract;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{Player, PlayerPosition};
use crate::model::score::{RoundScore, TRICKS_PER_ROUND, score_round};
use crate::model::trick::{Trick, TrickError};
use crate::policy::{BidContext, PlayContext, Policy};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Bidding,
    Playing,
    /// All eight tricks are down; scores not yet computed.
    Finished,
    Scored,
    /// Nobody bid. Every card is back in the deck.
    Redeal,
}

/// One hand of play, from the deal to the score.
#[derive(Debug, Clone)]
pub struct RoundState {
    round_number: u32,
    dealer: PlayerPosition,
    order: [PlayerPosition; 4],
    deck: Deck,
    hands: [Hand; 4],
    auction: Auction,
    contract: Option<Contract>,
    current_trick: Option<Trick>,
    tricks: Vec<Trick>,
    phase: RoundPhase,
    score: Option<RoundScore>,
}

impl RoundState {
    /// Deals `deck` starting with the seat after `dealer`; the dealer receives last.
    pub fn deal(round_number: u32, dealer: PlayerPosition, mut deck: Deck) -> Result<Self, ContreeError> {
        let order = dealer.next().rotation();
        let hands = deck.deal(&order)?;
        tracing::debug!(
            target: "contree_core::play",
            round = round_number,
            dealer = ?dealer,
            "hands dealt"
        );
        Ok(Self {
            round_number,
            dealer,
            order,
            deck,
            hands,
            auction: Auction::new(),
            contract: None,
            current_trick: None,
            tricks: Vec::with_capacity(TRICKS_PER_ROUND),
            phase: RoundPhase::Bidding,
            score: None,
        })
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn dealer(&self) -> PlayerPosition {
        self.dealer
    }

    /// Bidding and dealing order: the seat after the dealer first, the dealer last.
    pub fn players_order(&self) -> [PlayerPosition; 4] {
        self.order
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn bids(&self) -> &[Bid] {
        self.auction.bids()
    }

    pub fn contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    pub fn current_trick(&self) -> Option<&Trick> {
        self.current_trick.as_ref()
    }

    pub fn tricks(&self) -> &[Trick] {
        &self.tricks
    }

    pub fn score(&self) -> Option<&RoundScore> {
        self.score.as_ref()
    }

    /// Hands the deck back to the caller, leaving this round without one.
    pub fn take_deck(&mut self) -> Deck {
        std::mem::take(&mut self.deck)
    }

    pub fn next_bidder(&self) -> Option<PlayerPosition> {
        match self.phase {
            RoundPhase::Bidding => Some(self.order[self.auction.bids().len() % 4]),
            _ => None,
        }
    }

    pub fn next_to_play(&self) -> Option<PlayerPosition> {
        match self.phase {
            RoundPhase::Playing => self.current_trick.as_ref().map(Trick::expected_position),
            _ => None,
        }
    }

    /// Records a call for the seat whose turn it is. Invalid calls become Pass.
    pub fn submit_bid(&mut self, bid: Bid) -> Result<Bid, BidError> {
        let expected = self.next_bidder().ok_or(BidError::NotInBiddingPhase)?;
        if expected != bid.player {
            return Err(BidError::OutOfTurn {
                expected,
                actual: bid.player,
            });
        }
        let accepted = self.auction.submit(bid)?;
        match self.auction.outcome() {
            Some(AuctionOutcome::Contract(contract)) => {
                tracing::info!(
                    target: "contree_core::bidding",
                    round = self.round_number,
                    contract = %contract,
                    "contract formed"
                );
                self.contract = Some(contract);
                self.current_trick = Some(Trick::new(self.order[0], contract.trump()));
                self.phase = RoundPhase::Playing;
            }
            Some(AuctionOutcome::Redeal) => self.handle_redeal(),
            None => {}
        }
        Ok(accepted)
    }

    /// Returns every hand to the deck after an all-pass auction.
    fn handle_redeal(&mut self) {
        for seat in self.order {
            let cards = self.hands[seat.index()].take_all();
            self.deck.return_cards(cards);
        }
        self.phase = RoundPhase::Redeal;
        tracing::info!(
            target: "contree_core::bidding",
            round = self.round_number,
            "all passed, redeal"
        );
    }

    /// Cards `seat` may play into the current trick; empty outside play.
    pub fn legal_cards(&self, seat: PlayerPosition) -> Vec<Card> {
        match (&self.phase, &self.current_trick) {
            (RoundPhase::Playing, Some(trick)) => legal_cards(&self.hands[seat.index()], trick, seat),
            _ => Vec::new(),
        }
    }

    /// Plays a card for the seat whose turn it is. A card that is not held or
    /// not legal is replaced by the first legal card.
    pub fn play_card(&mut self, seat: PlayerPosition, card: Card) -> Result<PlayOutcome, PlayError> {
        let expected = self.next_to_play().ok_or(PlayError::NotInPlayPhase)?;
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        let legal = self.legal_cards(seat);
        let Some(&fallback) = legal.first() else {
            return Err(PlayError::EmptyHand(seat));
        };
        let card = if legal.contains(&card) {
            card
        } else {
            tracing::warn!(
                target: "contree_core::play",
                seat = ?seat,
                offered = %card,
                played = %fallback,
                reason = "illegal_card",
                message = "clamping to first legal card"
            );
            fallback
        };

        let trick = self.current_trick.as_mut().ok_or(PlayError::NotInPlayPhase)?;
        trick.play(seat, card)?;
        self.hands[seat.index()].remove(card);

        if !trick.is_complete() {
            return Ok(PlayOutcome::Played { card });
        }
        let Some(winner) = trick.winner() else {
            return Ok(PlayOutcome::Played { card });
        };
        let points = trick.points();
        let trump = trick.trump();
        self.deck
            .return_cards(trick.plays().iter().rev().map(|play| play.card));
        let finished = std::mem::replace(trick, Trick::new(winner, trump));
        self.tricks.push(finished);
        tracing::debug!(
            target: "contree_core::play",
            round = self.round_number,
            trick = self.tricks.len(),
            winner = ?winner,
            points,
            "trick won"
        );

        if self.tricks.len() == TRICKS_PER_ROUND {
            self.current_trick = None;
            self.phase = RoundPhase::Finished;
        }
        Ok(PlayOutcome::TrickCompleted {
            card,
            winner,
            points,
        })
    }

    /// Runs the auction to its end, asking each seat in turn.
    ///
    /// `players` is indexed by [`PlayerPosition::index`]. Human seats are
    /// answered by `interaction`; without one they pass.
    pub fn manage_bidding(
        &mut self,
        players: &mut [Player; 4],
        mut interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Result<Option<Contract>, BidError> {
        while let Some(seat) = self.next_bidder() {
            let ctx = BidContext {
                seat,
                hand: &self.hands[seat.index()],
                history: self.auction.bids(),
            };
            let call = players[seat.index()]
                .decide_bid(&ctx, interaction.as_deref_mut())
                .unwrap_or(Call::Pass);
            self.submit_bid(Bid::new(seat, call))?;
        }
        Ok(self.contract)
    }

    /// Plays the current trick to completion and returns its winner.
    ///
    /// The leader is the previous trick's winner, or the first seat of
    /// [`players_order`](Self::players_order) for the opening trick.
    pub fn play_trick(
        &mut self,
        players: &mut [Player; 4],
        mut interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Result<PlayerPosition, PlayError> {
        loop {
            let seat = self.next_to_play().ok_or(PlayError::NotInPlayPhase)?;
            let legal = self.legal_cards(seat);
            let (Some(trick), Some(contract)) = (self.current_trick.as_ref(), self.contract.as_ref())
            else {
                return Err(PlayError::NotInPlayPhase);
            };
            let Some(&first_legal) = legal.first() else {
                return Err(PlayError::EmptyHand(seat));
            };
            let ctx = PlayContext {
                seat,
                hand: &self.hands[seat.index()],
                trick,
                contract,
                legal: &legal,
            };
            let choice = players[seat.index()]
                .decide_card(&ctx, interaction.as_deref_mut())
                .unwrap_or(first_legal);
            if let PlayOutcome::TrickCompleted { winner, .. } = self.play_card(seat, choice)? {
                return Ok(winner);
            }
        }
    }

    pub fn play_all_tricks(
        &mut self,
        players: &mut [Player; 4],
        mut interaction: Option<&mut (dyn Policy + '_)>,
    ) -> Result<(), PlayError> {
        while self.phase == RoundPhase::Playing {
            self.play_trick(players, interaction.as_deref_mut())?;
        }
        Ok(())
    }

    /// Scores the round once every trick is down. A redeal scores nothing.
    pub fn calculate_round_scores(&mut self) -> Result<RoundScore, PlayError> {
        match (self.phase, self.contract, self.score) {
            (RoundPhase::Scored, _, Some(score)) => Ok(score),
            (RoundPhase::Redeal, _, _) => Ok(RoundScore::redeal()),
            (RoundPhase::Finished, Some(contract), _) => {
                let score = score_round(&contract, &self.tricks);
                self.score = Some(score);
                self.phase = RoundPhase::Scored;
                Ok(score)
            }
            _ => Err(PlayError::RoundInProgress),
        }
    }
}

/// Cards from `hand` that `seat` may add to `trick`.
///
/// Follow suit when possible. Otherwise any card goes when the partner led,
/// when there is no trump, or when trump was led. Otherwise a trump is
/// required, and it must beat the best opponent trump when the hand can.
pub fn legal_cards(hand: &Hand, trick: &Trick, seat: PlayerPosition) -> Vec<Card> {
    let whole_hand = || hand.cards().to_vec();
    let Some(lead) = trick.lead_suit() else {
        return whole_hand();
    };
    let following = hand.of_suit(lead);
    if !following.is_empty() {
        return following;
    }
    if trick.leader() == seat.partner() {
        return whole_hand();
    }
    let Some(trump) = trick.trump() else {
        return whole_hand();
    };
    if lead == trump {
        return whole_hand();
    }
    let trumps = hand.of_suit(trump);
    if trumps.is_empty() {
        return whole_hand();
    }

    let highest_opponent_trump = trick
        .plays()
        .iter()
        .filter(|play| play.position.team() != seat.team() && play.card.suit == trump)
        .map(|play| play.card.order(Some(trump)))
        .max();
    match highest_opponent_trump {
        None => trumps,
        Some(highest) => {
            let overtrumps: Vec<Card> = trumps
                .iter()
                .copied()
                .filter(|card| card.order(Some(trump)) > highest)
                .collect();
            if overtrumps.is_empty() {
                trumps
            } else {
                overtrumps
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played {
        card: Card,
    },
    TrickCompleted {
        card: Card,
        winner: PlayerPosition,
        points: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("cards can only be played during the playing phase")]
    NotInPlayPhase,
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn {
        expected: PlayerPosition,
        actual: PlayerPosition,
    },
    #[error("{0} has no card to play")]
    EmptyHand(PlayerPosition),
    #[error("the round has not finished")]
    RoundInProgress,
    #[error(transparent)]
    Trick(#[from] TrickError),
}
