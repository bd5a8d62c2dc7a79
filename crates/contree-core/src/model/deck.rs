use crate::error::ContreeError;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::array;

pub const DECK_SIZE: usize = 32;
pub const HAND_SIZE: usize = 8;

/// Packet sizes of the three dealing passes.
const DEAL_PACKETS: [usize; 3] = [3, 2, 3];
/// Cards that must stay on each side of a cut.
const CUT_MARGIN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Splits the deck at a random point away from both ends and moves the
    /// bottom part on top. Decks with fewer than eight cards are left alone.
    pub fn cut<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = self.cards.len();
        if len < 8 {
            return;
        }
        let split = rng.gen_range(CUT_MARGIN..=len - CUT_MARGIN - 1);
        self.cards.rotate_left(split);
    }

    /// Deals the full deck 3-2-3 following `order`; the dealer must come last.
    ///
    /// Returned hands are indexed by [`PlayerPosition::index`]. The deck is
    /// empty afterwards.
    pub fn deal(&mut self, order: &[PlayerPosition]) -> Result<[Hand; 4], ContreeError> {
        if order.len() != 4 {
            return Err(ContreeError::player_count(4, order.len(), "dealing"));
        }
        if self.cards.len() != DECK_SIZE {
            return Err(ContreeError::card_count(
                DECK_SIZE,
                self.cards.len(),
                "dealing",
            ));
        }
        for (idx, seat) in order.iter().enumerate() {
            if order[..idx].contains(seat) {
                return Err(ContreeError::InvalidPosition {
                    position: *seat,
                    context: "dealing",
                });
            }
        }

        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        let mut cursor = 0;
        for packet in DEAL_PACKETS {
            for seat in order {
                hands[seat.index()].extend(self.cards[cursor..cursor + packet].iter().copied());
                cursor += packet;
            }
        }
        self.cards.clear();
        Ok(hands)
    }

    /// Puts cards back on top of the deck, in the given order.
    pub fn return_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    pub fn reset(&mut self) {
        *self = Self::standard();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck with {} cards", self.cards.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{DECK_SIZE, Deck};
    use crate::error::ContreeError;
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn sorted(cards: &[Card]) -> Vec<String> {
        let mut labels: Vec<String> = cards.iter().map(|c| format!("{c:?}")).collect();
        labels.sort();
        labels
    }

    #[test]
    fn standard_deck_has_32_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
        assert_ne!(deck_a.cards(), Deck::shuffled_with_seed(43).cards());
    }

    #[test]
    fn shuffle_and_cut_are_permutations() {
        let mut rng = StdRng::seed_from_u64(7);
        let reference = sorted(Deck::standard().cards());
        for _ in 0..20 {
            let mut deck = Deck::shuffled(&mut rng);
            assert_eq!(sorted(deck.cards()), reference);
            deck.cut(&mut rng);
            assert_eq!(deck.len(), DECK_SIZE);
            assert_eq!(sorted(deck.cards()), reference);
        }
    }

    #[test]
    fn cut_moves_tail_to_front() {
        let mut rng = StdRng::seed_from_u64(3);
        let original = Deck::standard();
        let mut deck = original.clone();
        deck.cut(&mut rng);
        let split = original
            .cards()
            .iter()
            .position(|c| *c == deck.cards()[0])
            .unwrap();
        assert!((3..=28).contains(&split));
        let mut expected = original.cards()[split..].to_vec();
        expected.extend_from_slice(&original.cards()[..split]);
        assert_eq!(deck.cards(), expected.as_slice());
    }

    #[test]
    fn cut_with_few_cards_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut deck = Deck::default();
        deck.return_cards(Deck::standard().cards()[..6].iter().copied());
        let before = deck.clone();
        deck.cut(&mut rng);
        assert_eq!(deck, before);
    }

    #[test]
    fn deal_gives_disjoint_exhaustive_hands() {
        let mut deck = Deck::shuffled_with_seed(11);
        let original = deck.clone();
        let hands = deck.deal(&PlayerPosition::West.rotation()).unwrap();
        assert!(deck.is_empty());

        let mut seen = HashSet::new();
        for hand in &hands {
            assert_eq!(hand.len(), 8);
            for card in hand.iter() {
                assert!(seen.insert(*card), "duplicate {card}");
            }
        }
        let all: HashSet<_> = original.cards().iter().copied().collect();
        assert_eq!(seen, all);
    }

    #[test]
    fn deal_follows_three_two_three_packets() {
        let mut deck = Deck::standard();
        let cards = deck.cards().to_vec();
        let order = PlayerPosition::North.rotation();
        let hands = deck.deal(&order).unwrap();

        for (i, seat) in order.iter().enumerate() {
            let mut expected = Vec::new();
            expected.extend_from_slice(&cards[i * 3..i * 3 + 3]);
            expected.extend_from_slice(&cards[12 + i * 2..12 + i * 2 + 2]);
            expected.extend_from_slice(&cards[20 + i * 3..20 + i * 3 + 3]);
            assert_eq!(sorted(hands[seat.index()].cards()), sorted(&expected));
        }
    }

    #[test]
    fn deal_rejects_wrong_player_count() {
        let mut deck = Deck::standard();
        let err = deck
            .deal(&[
                PlayerPosition::North,
                PlayerPosition::East,
                PlayerPosition::South,
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            ContreeError::InvalidPlayerCount {
                expected: 4,
                actual: 3,
                ..
            }
        ));
        assert_eq!(deck.len(), DECK_SIZE);
    }

    #[test]
    fn deal_rejects_incomplete_deck() {
        let mut deck = Deck::default();
        deck.return_cards(Deck::standard().cards()[..20].iter().copied());
        let err = deck.deal(&PlayerPosition::North.rotation()).unwrap_err();
        assert!(matches!(
            err,
            ContreeError::InvalidCardCount {
                expected: 32,
                actual: 20,
                ..
            }
        ));
    }

    #[test]
    fn deal_rejects_repeated_seat() {
        let mut deck = Deck::standard();
        let err = deck
            .deal(&[
                PlayerPosition::North,
                PlayerPosition::North,
                PlayerPosition::South,
                PlayerPosition::East,
            ])
            .unwrap_err();
        assert!(matches!(err, ContreeError::InvalidPosition { .. }));
    }

    #[test]
    fn reset_restores_full_deck() {
        let mut deck = Deck::standard();
        deck.deal(&PlayerPosition::North.rotation()).unwrap();
        assert_eq!(deck.to_string(), "Deck with 0 cards");
        deck.reset();
        assert_eq!(deck.len(), DECK_SIZE);
    }
}
