use crate::model::bid::{Bid, Call};
use crate::model::card::Card;
use crate::model::contract::Contract;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::model::trick::Trick;

/// What a seat can see when it is asked for a call.
pub struct BidContext<'a> {
    pub seat: PlayerPosition,
    pub hand: &'a Hand,
    /// Accepted bids of this round, oldest first.
    pub history: &'a [Bid],
}

/// What a seat can see when it is asked for a card.
pub struct PlayContext<'a> {
    pub seat: PlayerPosition,
    pub hand: &'a Hand,
    pub trick: &'a Trick,
    pub contract: &'a Contract,
    /// Never empty while the seat holds cards.
    pub legal: &'a [Card],
}

impl PlayContext<'_> {
    /// First legal card, else the first card held. A context with neither
    /// still yields a card; the round replaces anything it cannot accept.
    pub fn fallback_card(&self) -> Card {
        self.legal
            .first()
            .or(self.hand.cards().first())
            .copied()
            .unwrap_or(Card::new(Rank::Seven, Suit::Spades))
    }
}

/// Decision provider for one seat, or the interaction collaborator that
/// answers for human-controlled seats.
///
/// Answers outside the rules are not errors: the round replaces an invalid
/// call with Pass and an illegal card with the first legal one.
pub trait Policy: Send {
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> Call;

    fn choose_card(&mut self, ctx: &PlayContext<'_>) -> Card;
}

/// Always passes and plays the first legal card.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassivePolicy;

impl Policy for PassivePolicy {
    fn choose_bid(&mut self, _ctx: &BidContext<'_>) -> Call {
        Call::Pass
    }

    fn choose_card(&mut self, ctx: &PlayContext<'_>) -> Card {
        ctx.fallback_card()
    }
}
