mod heuristic;

pub use contree_core::policy::{BidContext, PlayContext, Policy};
pub use heuristic::HeuristicPolicy;
