pub mod bot;
pub mod policy;

pub use bot::{BidPlanner, BotDifficulty, PlayPlanner, SuitEvaluation};
pub use policy::HeuristicPolicy;
