use crate::model::player::PlayerPosition;
use thiserror::Error;

/// Construction-time invariant violations.
///
/// In-game choices that break the rules (an illegal bid, a card outside the
/// legal set) are never reported through this type; the round recovers from
/// them locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContreeError {
    #[error("{context}: expected {expected} players, got {actual}")]
    InvalidPlayerCount {
        expected: usize,
        actual: usize,
        context: &'static str,
    },
    #[error("{context}: expected {expected} cards, got {actual}")]
    InvalidCardCount {
        expected: usize,
        actual: usize,
        context: &'static str,
    },
    #[error("{context}: seat {position} is missing or occupied twice")]
    InvalidPosition {
        position: PlayerPosition,
        context: &'static str,
    },
    #[error("invalid contract parameters: {message}")]
    InvalidContractParameters { message: String },
}

impl ContreeError {
    pub(crate) fn player_count(expected: usize, actual: usize, context: &'static str) -> Self {
        ContreeError::InvalidPlayerCount {
            expected,
            actual,
            context,
        }
    }

    pub(crate) fn card_count(expected: usize, actual: usize, context: &'static str) -> Self {
        ContreeError::InvalidCardCount {
            expected,
            actual,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContreeError;
    use crate::model::player::PlayerPosition;

    #[test]
    fn messages_carry_context() {
        let err = ContreeError::player_count(4, 3, "dealing");
        assert_eq!(err.to_string(), "dealing: expected 4 players, got 3");

        let err = ContreeError::InvalidPosition {
            position: PlayerPosition::West,
            context: "creating game",
        };
        assert!(err.to_string().contains("West"));
    }
}
