use super::holds;
use contree_core::model::bid::{
    Bid, Call, ContractBid, ContractValue, MAX_CONTRACT_POINTS, has_double, last_contract,
};
use contree_core::model::hand::Hand;
use contree_core::model::player::PlayerPosition;
use contree_core::model::rank::Rank;
use contree_core::model::strain::Strain;
use contree_core::model::suit::Suit;
use contree_core::policy::BidContext;
use tracing::{Level, event};

/// Outside high-card strength (Aces, Tens, Kings) needed to double.
const DOUBLE_STRENGTH: u32 = 25;
/// Redouble when hand points reach four fifths of the contract.
const REDOUBLE_NUMERATOR: u32 = 4;
const REDOUBLE_DENOMINATOR: u32 = 5;
const MAX_ESTIMATED_TRICKS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrumpHonours {
    JackOrNine,
    JackAndNine,
    JackNineAndAce,
}

impl TrumpHonours {
    fn held(self, hand: &Hand, trump: Suit) -> bool {
        let jack = holds(hand, Rank::Jack, trump);
        let nine = holds(hand, Rank::Nine, trump);
        match self {
            TrumpHonours::JackOrNine => jack || nine,
            TrumpHonours::JackAndNine => jack && nine,
            TrumpHonours::JackNineAndAce => jack && nine && holds(hand, Rank::Ace, trump),
        }
    }
}

/// Minimum holding for opening at `value` in a trump suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiddingRow {
    pub value: u16,
    pub honours: TrumpHonours,
    pub min_trumps: usize,
    pub outside_aces: usize,
    pub guarded_tens: usize,
    pub min_tricks: u32,
    pub needs_belote: bool,
}

const fn row(
    value: u16,
    honours: TrumpHonours,
    min_trumps: usize,
    outside_aces: usize,
    guarded_tens: usize,
    min_tricks: u32,
    needs_belote: bool,
) -> BiddingRow {
    BiddingRow {
        value,
        honours,
        min_trumps,
        outside_aces,
        guarded_tens,
        min_tricks,
        needs_belote,
    }
}

pub const BIDDING_TABLE: [BiddingRow; 9] = [
    row(80, TrumpHonours::JackOrNine, 3, 1, 0, 4, false),
    row(90, TrumpHonours::JackAndNine, 3, 1, 0, 4, false),
    row(100, TrumpHonours::JackOrNine, 3, 2, 0, 5, false),
    row(110, TrumpHonours::JackAndNine, 3, 2, 0, 5, false),
    row(120, TrumpHonours::JackOrNine, 3, 3, 0, 6, false),
    row(130, TrumpHonours::JackAndNine, 3, 3, 0, 6, false),
    row(140, TrumpHonours::JackOrNine, 4, 3, 1, 6, true),
    row(150, TrumpHonours::JackAndNine, 4, 3, 1, 6, true),
    row(160, TrumpHonours::JackNineAndAce, 5, 3, 2, 7, true),
];

/// How a hand would fare with `suit` as trump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitEvaluation {
    pub suit: Suit,
    /// Highest table value the hand supports, if any.
    pub contract: Option<u16>,
    pub trump_count: usize,
    pub outside_aces: usize,
    /// Outside tens with at least one other card of their suit.
    pub guarded_tens: usize,
    pub estimated_tricks: u32,
    pub belote: bool,
}

impl SuitEvaluation {
    pub fn evaluate(hand: &Hand, suit: Suit) -> Self {
        let outside = || Suit::ALL.into_iter().filter(move |other| *other != suit);
        let mut evaluation = Self {
            suit,
            contract: None,
            trump_count: hand.of_suit(suit).len(),
            outside_aces: outside()
                .filter(|other| holds(hand, Rank::Ace, *other))
                .count(),
            guarded_tens: outside()
                .filter(|other| holds(hand, Rank::Ten, *other) && hand.of_suit(*other).len() > 1)
                .count(),
            estimated_tricks: estimate_tricks(hand, suit),
            belote: holds(hand, Rank::King, suit) && holds(hand, Rank::Queen, suit),
        };
        let contract = BIDDING_TABLE
            .iter()
            .filter(|row| evaluation.meets(row, hand))
            .map(|row| row.value)
            .max();
        evaluation.contract = contract;
        evaluation
    }

    fn meets(&self, row: &BiddingRow, hand: &Hand) -> bool {
        row.honours.held(hand, self.suit)
            && self.trump_count >= row.min_trumps
            && self.outside_aces >= row.outside_aces
            && self.guarded_tens >= row.guarded_tens
            && self.estimated_tricks >= row.min_tricks
            && (!row.needs_belote || self.belote)
    }
}

/// Rough trick count: up to three from trump honours plus one per outside Ace.
pub fn estimate_tricks(hand: &Hand, trump: Suit) -> u32 {
    let trump_strength: u32 = hand
        .of_suit(trump)
        .iter()
        .map(|card| card.points(Some(trump)))
        .sum();
    let trump_tricks = match trump_strength {
        40.. => 3,
        25.. => 2,
        15.. => 1,
        _ => 0,
    };
    let outside_aces = Suit::ALL
        .into_iter()
        .filter(|suit| *suit != trump && holds(hand, Rank::Ace, *suit))
        .count() as u32;
    (trump_tricks + outside_aces).min(MAX_ESTIMATED_TRICKS)
}

/// Best opening among evaluations given in Spades, Hearts, Diamonds, Clubs
/// order: highest value, then belote, then the earlier suit.
pub fn pick_suit(evaluations: &[SuitEvaluation]) -> Option<&SuitEvaluation> {
    let top = evaluations.iter().filter_map(|e| e.contract).max()?;
    evaluations
        .iter()
        .filter(|e| e.contract == Some(top))
        .fold(None, |chosen: Option<&SuitEvaluation>, candidate| match chosen {
            Some(current) if current.belote || !candidate.belote => Some(current),
            _ => Some(candidate),
        })
}

pub struct BidPlanner;

impl BidPlanner {
    pub fn choose(ctx: &BidContext<'_>) -> Call {
        let (call, reason) = Self::decide(ctx);
        log_bid_decision(ctx, call, reason);
        call
    }

    fn decide(ctx: &BidContext<'_>) -> (Call, &'static str) {
        let last = last_contract(ctx.history);
        if let Some(call) = escalation(ctx, last) {
            return (call, "escalate");
        }

        let evaluations = Suit::ALL.map(|suit| SuitEvaluation::evaluate(ctx.hand, suit));
        let best = evaluations.iter().filter_map(|e| e.contract).max();
        let partner_call = ctx
            .history
            .iter()
            .rev()
            .find(|bid| bid.player == ctx.seat.partner() && !bid.call.is_pass())
            .map(|bid| bid.call);

        match partner_call {
            None => opening(&evaluations, last),
            Some(Call::Contract(bid))
                if best.is_some_and(|value| ContractValue::Points(value) > bid.value) =>
            {
                opening(&evaluations, last)
            }
            Some(Call::Contract(bid)) => support(ctx.hand, bid, last),
            Some(_) => (Call::Pass, "partner_escalated"),
        }
    }
}

fn escalation(
    ctx: &BidContext<'_>,
    last: Option<(PlayerPosition, ContractBid)>,
) -> Option<Call> {
    let (bidder, bid) = last?;
    let call = if bidder.team() != ctx.seat.team() {
        if !should_double(ctx.hand, bid.strain) {
            return None;
        }
        Call::Double
    } else if has_double(ctx.history) && should_redouble(ctx.hand, bid) {
        Call::Redouble
    } else {
        return None;
    };
    Bid::new(ctx.seat, call)
        .is_valid_after(ctx.history)
        .then_some(call)
}

fn should_double(hand: &Hand, strain: Strain) -> bool {
    let trump = strain.trump();
    let outside_strength: u32 = hand
        .iter()
        .filter(|card| Some(card.suit) != trump)
        .map(|card| match card.rank {
            Rank::Ace => 11,
            Rank::Ten => 10,
            Rank::King => 4,
            _ => 0,
        })
        .sum();
    outside_strength >= DOUBLE_STRENGTH
}

fn should_redouble(hand: &Hand, bid: ContractBid) -> bool {
    let trump = bid.strain.trump();
    let points: u32 = hand.iter().map(|card| card.points(trump)).sum();
    points * REDOUBLE_DENOMINATOR >= bid.base_points() * REDOUBLE_NUMERATOR
}

fn opening(
    evaluations: &[SuitEvaluation],
    last: Option<(PlayerPosition, ContractBid)>,
) -> (Call, &'static str) {
    let Some(best) = pick_suit(evaluations) else {
        return (Call::Pass, "no_contract");
    };
    let Some(value) = best.contract else {
        return (Call::Pass, "no_contract");
    };
    if last.is_some_and(|(_, previous)| previous.value >= ContractValue::Points(value)) {
        return (Call::Pass, "outbid");
    }
    match ContractBid::new(value, Strain::from(best.suit)) {
        Ok(bid) => (Call::Contract(bid), "table"),
        Err(_) => (Call::Pass, "no_contract"),
    }
}

/// Raises the partner's contract: ten per outside Ace, ten more for the
/// trump Jack or Nine.
fn support(
    hand: &Hand,
    partner: ContractBid,
    last: Option<(PlayerPosition, ContractBid)>,
) -> (Call, &'static str) {
    let ContractValue::Points(partner_value) = partner.value else {
        return (Call::Pass, "partner_capot");
    };
    let trump = partner.strain.trump();
    let aces = hand
        .iter()
        .filter(|card| card.rank == Rank::Ace && Some(card.suit) != trump)
        .count() as u16;
    let complement = trump
        .is_some_and(|suit| holds(hand, Rank::Jack, suit) || holds(hand, Rank::Nine, suit));
    let raw = partner_value + 10 * aces + if complement { 10 } else { 0 };
    let raised = (raw + 5) / 10 * 10;

    if last.is_some_and(|(_, previous)| previous.value >= ContractValue::Points(raised)) {
        return (Call::Pass, "support_too_low");
    }
    if raised > MAX_CONTRACT_POINTS {
        return (Call::Pass, "support_too_high");
    }
    match ContractBid::new(raised, partner.strain) {
        Ok(bid) => (Call::Contract(bid), "support"),
        Err(_) => (Call::Pass, "support_too_high"),
    }
}

fn log_bid_decision(ctx: &BidContext<'_>, call: Call, reason: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "contree_bot::bid",
        Level::DEBUG,
        seat = ?ctx.seat,
        history_len = ctx.history.len(),
        call = %call,
        reason,
    );
}

#[cfg(test)]
mod tests {
    use super::{BidPlanner, SuitEvaluation, estimate_tricks, pick_suit};
    use contree_core::model::bid::{Bid, Call, ContractBid};
    use contree_core::model::card::Card;
    use contree_core::model::hand::Hand;
    use contree_core::model::player::PlayerPosition::{self, East, North, South, West};
    use contree_core::model::rank::Rank::{self, Ace, Eight, Jack, King, Nine, Queen, Seven, Ten};
    use contree_core::model::strain::Strain;
    use contree_core::model::suit::Suit::{self, Clubs, Diamonds, Hearts, Spades};
    use contree_core::policy::BidContext;

    fn hand(cards: &[(Rank, Suit)]) -> Hand {
        Hand::with_cards(cards.iter().map(|&(rank, suit)| Card::new(rank, suit)).collect())
    }

    fn strong_spades() -> Hand {
        hand(&[
            (Jack, Spades),
            (Nine, Spades),
            (Ace, Spades),
            (Ten, Spades),
            (Ace, Hearts),
            (Ace, Diamonds),
            (Seven, Clubs),
            (Eight, Clubs),
        ])
    }

    fn contract(seat: PlayerPosition, value: u16, strain: Strain) -> Bid {
        Bid::new(seat, Call::Contract(ContractBid::new(value, strain).unwrap()))
    }

    fn decide(seat: PlayerPosition, hand: &Hand, history: &[Bid]) -> Call {
        BidPlanner::choose(&BidContext {
            seat,
            hand,
            history,
        })
    }

    #[test]
    fn evaluates_trump_suit_against_table() {
        let eval = SuitEvaluation::evaluate(&strong_spades(), Spades);
        assert_eq!(eval.trump_count, 4);
        assert_eq!(eval.outside_aces, 2);
        assert_eq!(eval.guarded_tens, 0);
        assert_eq!(eval.estimated_tricks, 5);
        assert_eq!(eval.contract, Some(110));
        assert_eq!(SuitEvaluation::evaluate(&strong_spades(), Hearts).contract, None);
    }

    #[test]
    fn trick_estimate_counts_honours_and_aces() {
        let weak = hand(&[(Seven, Hearts), (Queen, Hearts), (Ace, Clubs)]);
        assert_eq!(estimate_tricks(&weak, Hearts), 1);
        let all_trumps = hand(&[
            (Jack, Hearts),
            (Nine, Hearts),
            (Ace, Hearts),
            (Ace, Spades),
            (Ace, Clubs),
            (Ace, Diamonds),
        ]);
        assert_eq!(estimate_tricks(&all_trumps, Hearts), 6);
    }

    #[test]
    fn opens_best_table_contract() {
        let call = decide(South, &strong_spades(), &[]);
        assert_eq!(
            call,
            Call::Contract(ContractBid::new(110, Strain::Spades).unwrap())
        );
    }

    #[test]
    fn weak_hand_passes() {
        let weak = hand(&[
            (Seven, Spades),
            (Eight, Spades),
            (Seven, Hearts),
            (Eight, Hearts),
            (Seven, Diamonds),
            (Eight, Diamonds),
            (Seven, Clubs),
            (Eight, Clubs),
        ]);
        assert_eq!(decide(West, &weak, &[]), Call::Pass);
    }

    #[test]
    fn doubles_opponent_with_outside_strength() {
        let history = [contract(West, 120, Strain::Hearts)];
        assert_eq!(decide(South, &strong_spades(), &history), Call::Double);
    }

    #[test]
    fn passes_when_already_outbid() {
        let history = [
            contract(West, 120, Strain::Clubs),
            Bid::pass(South),
            Bid::pass(East),
        ];
        assert_eq!(decide(North, &strong_spades(), &history), Call::Pass);
    }

    #[test]
    fn supports_partner_with_aces_and_jack() {
        let support = hand(&[
            (Ace, Spades),
            (Ace, Diamonds),
            (Jack, Hearts),
            (Seven, Clubs),
            (Eight, Clubs),
            (Nine, Clubs),
            (Seven, Diamonds),
            (Eight, Diamonds),
        ]);
        let history = [contract(North, 80, Strain::Hearts), Bid::pass(East)];
        assert_eq!(
            decide(South, &support, &history),
            Call::Contract(ContractBid::new(110, Strain::Hearts).unwrap())
        );
    }

    #[test]
    fn redoubles_strong_doubled_contract() {
        let strong = hand(&[
            (Jack, Hearts),
            (Nine, Hearts),
            (Ace, Hearts),
            (Ace, Spades),
            (Ace, Diamonds),
            (Seven, Clubs),
            (Eight, Clubs),
            (Seven, Diamonds),
        ]);
        let history = [
            contract(South, 80, Strain::Hearts),
            Bid::new(West, Call::Double),
        ];
        assert_eq!(decide(North, &strong, &history), Call::Redouble);
    }

    #[test]
    fn tie_break_prefers_belote_then_suit_order() {
        let eval = |suit: Suit, belote: bool| SuitEvaluation {
            suit,
            contract: Some(90),
            trump_count: 3,
            outside_aces: 1,
            guarded_tens: 0,
            estimated_tricks: 4,
            belote,
        };
        let plain = [eval(Spades, false), eval(Diamonds, false)];
        assert_eq!(pick_suit(&plain).map(|e| e.suit), Some(Spades));

        let with_belote = [eval(Hearts, false), eval(Clubs, true)];
        assert_eq!(pick_suit(&with_belote).map(|e| e.suit), Some(Clubs));

        let mut higher = eval(Diamonds, false);
        higher.contract = Some(100);
        let mixed = [eval(Spades, true), higher];
        assert_eq!(pick_suit(&mixed).map(|e| e.suit), Some(Diamonds));
    }

    #[test]
    fn king_queen_counts_as_belote() {
        let cards = hand(&[(King, Clubs), (Queen, Clubs), (Jack, Clubs)]);
        assert!(SuitEvaluation::evaluate(&cards, Clubs).belote);
        assert!(!SuitEvaluation::evaluate(&cards, Hearts).belote);
    }
}
