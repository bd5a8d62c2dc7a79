use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: PlayerPosition,
    trump: Option<Suit>,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub position: PlayerPosition,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrickError {
    #[error("trick already complete")]
    TrickComplete,
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn {
        expected: PlayerPosition,
        actual: PlayerPosition,
    },
    #[error("{0} has already played this trick")]
    AlreadyPlayed(PlayerPosition),
}

impl Trick {
    pub fn new(leader: PlayerPosition, trump: Option<Suit>) -> Self {
        Self {
            leader,
            trump,
            plays: Vec::with_capacity(4),
        }
    }

    pub fn leader(&self) -> PlayerPosition {
        self.leader
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn play(&mut self, position: PlayerPosition, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.position == position) {
            return Err(TrickError::AlreadyPlayed(position));
        }

        let expected = self.expected_position();
        if expected != position {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: position,
            });
        }

        self.plays.push(Play { position, card });
        Ok(())
    }

    /// The play currently holding the trick, if any card is down.
    ///
    /// Left-to-right reduction: a card takes over when it is the first trump,
    /// a higher trump, or a higher card of the lead suit while no trump is down.
    pub fn best_play(&self) -> Option<Play> {
        let lead = self.lead_suit()?;
        let trump = self.trump;
        self.plays.iter().copied().reduce(|best, play| {
            let card = play.card;
            let best_card = best.card;
            let takes_over = match (card.is_trump(trump), best_card.is_trump(trump)) {
                (true, false) => true,
                (true, true) => card.order(trump) > best_card.order(trump),
                (false, false) => card.suit == lead && card.order(trump) > best_card.order(trump),
                (false, true) => false,
            };
            if takes_over { play } else { best }
        })
    }

    pub fn current_winner(&self) -> Option<PlayerPosition> {
        self.best_play().map(|play| play.position)
    }

    /// Winner of a complete trick.
    pub fn winner(&self) -> Option<PlayerPosition> {
        if !self.is_complete() {
            return None;
        }
        self.current_winner()
    }

    pub fn points(&self) -> u32 {
        self.plays.iter().map(|play| play.card.points(self.trump)).sum()
    }

    /// The seat expected to play next; the leader on an empty trick.
    pub fn expected_position(&self) -> PlayerPosition {
        self.plays
            .last()
            .map(|play| play.position.next())
            .unwrap_or(self.leader)
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition::{self, East, North, South, West};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn full_trick(
        leader: PlayerPosition,
        trump: Option<Suit>,
        cards: [(Rank, Suit); 4],
    ) -> Trick {
        let mut trick = Trick::new(leader, trump);
        let mut seat = leader;
        for (rank, suit) in cards {
            trick.play(seat, Card::new(rank, suit)).unwrap();
            seat = seat.next();
        }
        trick
    }

    #[test]
    fn plays_follow_anticlockwise_turn_order() {
        let mut trick = Trick::new(North, Some(Suit::Hearts));
        trick.play(North, Card::new(Rank::Seven, Suit::Clubs)).unwrap();
        assert!(matches!(
            trick.play(East, Card::new(Rank::Eight, Suit::Clubs)),
            Err(TrickError::OutOfTurn {
                expected: West,
                actual: East
            })
        ));
        assert!(matches!(
            trick.play(North, Card::new(Rank::Nine, Suit::Clubs)),
            Err(TrickError::AlreadyPlayed(North))
        ));
        assert!(trick.play(West, Card::new(Rank::Eight, Suit::Clubs)).is_ok());
    }

    #[test]
    fn sole_trump_wins() {
        let trick = full_trick(
            North,
            Some(Suit::Hearts),
            [
                (Rank::Ace, Suit::Spades),
                (Rank::Seven, Suit::Hearts),
                (Rank::King, Suit::Spades),
                (Rank::Ace, Suit::Diamonds),
            ],
        );
        assert_eq!(trick.winner(), Some(West));
        assert_eq!(trick.points(), 11 + 4 + 11);
    }

    #[test]
    fn nine_of_trump_beats_ace_of_trump() {
        let trick = full_trick(
            South,
            Some(Suit::Clubs),
            [
                (Rank::Ace, Suit::Clubs),
                (Rank::Nine, Suit::Clubs),
                (Rank::Ten, Suit::Clubs),
                (Rank::Seven, Suit::Hearts),
            ],
        );
        assert_eq!(trick.winner(), Some(East));
        assert_eq!(trick.points(), 11 + 14 + 10);
    }

    #[test]
    fn off_suit_cards_never_win() {
        let trick = full_trick(
            East,
            Some(Suit::Spades),
            [
                (Rank::Seven, Suit::Diamonds),
                (Rank::Ace, Suit::Hearts),
                (Rank::Eight, Suit::Diamonds),
                (Rank::Ace, Suit::Clubs),
            ],
        );
        assert_eq!(trick.winner(), Some(West));
    }

    #[test]
    fn ten_outranks_king_without_trump() {
        let trick = full_trick(
            North,
            None,
            [
                (Rank::King, Suit::Hearts),
                (Rank::Ten, Suit::Hearts),
                (Rank::Jack, Suit::Spades),
                (Rank::Queen, Suit::Hearts),
            ],
        );
        assert_eq!(trick.winner(), Some(West));
        assert_eq!(trick.points(), 4 + 10 + 2 + 3);
    }

    #[test]
    fn partial_trick_reports_current_winner_only() {
        let mut trick = Trick::new(North, Some(Suit::Hearts));
        assert_eq!(trick.current_winner(), None);
        trick.play(North, Card::new(Rank::Ten, Suit::Spades)).unwrap();
        trick.play(West, Card::new(Rank::Ace, Suit::Spades)).unwrap();
        assert_eq!(trick.current_winner(), Some(West));
        assert_eq!(trick.winner(), None);
        assert_eq!(trick.expected_position(), South);
    }
}
