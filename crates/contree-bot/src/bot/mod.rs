mod bid;
mod play;

pub use bid::{BIDDING_TABLE, BidPlanner, BiddingRow, SuitEvaluation, TrumpHonours};
pub use play::PlayPlanner;

use contree_core::model::card::Card;
use contree_core::model::hand::Hand;
use contree_core::model::rank::Rank;
use contree_core::model::suit::Suit;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    /// Table bidding, first legal card in play.
    Easy,
    #[default]
    Normal,
}

impl BotDifficulty {
    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("CONTREE_BOT_DIFFICULTY")
                .ok()
                .and_then(|raw| Self::from_label(&raw))
                .unwrap_or_default()
        })
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "legacy" => Some(BotDifficulty::Easy),
            "normal" | "default" => Some(BotDifficulty::Normal),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Normal => "normal",
        }
    }
}

pub(crate) fn card_sort_key(card: Card) -> (u8, u8) {
    (card.suit as u8, card.rank.value())
}

pub(crate) fn holds(hand: &Hand, rank: Rank, suit: Suit) -> bool {
    hand.contains(Card::new(rank, suit))
}

#[cfg(test)]
mod tests {
    use super::BotDifficulty;

    #[test]
    fn difficulty_labels_parse() {
        assert_eq!(BotDifficulty::from_label(" Easy "), Some(BotDifficulty::Easy));
        assert_eq!(BotDifficulty::from_label("default"), Some(BotDifficulty::Normal));
        assert_eq!(BotDifficulty::from_label("expert"), None);
        assert_eq!(BotDifficulty::default().label(), "normal");
    }

    #[test]
    fn env_difficulty_matches_variable_or_defaults() {
        let expected = std::env::var("CONTREE_BOT_DIFFICULTY")
            .ok()
            .and_then(|raw| BotDifficulty::from_label(&raw))
            .unwrap_or_default();
        assert_eq!(BotDifficulty::from_env(), expected);
        assert_eq!(BotDifficulty::from_env(), BotDifficulty::from_env());
    }
}
