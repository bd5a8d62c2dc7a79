pub mod error;
pub mod game;
pub mod model;
pub mod policy;

pub use error::ContreeError;
pub use game::{GameError, GameOver, GameState, RoundSummary};
pub use policy::{BidContext, PassivePolicy, PlayContext, Policy};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "contree"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "contree");
        assert!(!AppInfo::version().is_empty());
    }
}
