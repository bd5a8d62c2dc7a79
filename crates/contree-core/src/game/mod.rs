pub mod game_state;

pub use game_state::{GameError, GameOver, GameState, RoundSummary};
