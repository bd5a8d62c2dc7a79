use super::{BidContext, PlayContext, Policy};
use crate::bot::{BidPlanner, BotDifficulty, PlayPlanner};
use contree_core::model::bid::Call;
use contree_core::model::card::Card;
use tracing::{Level, event};

/// Adapter that drives BidPlanner/PlayPlanner through the core Policy trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy {
    difficulty: BotDifficulty,
}

impl HeuristicPolicy {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self { difficulty }
    }

    pub fn easy() -> Self {
        Self::new(BotDifficulty::Easy)
    }

    pub fn normal() -> Self {
        Self::new(BotDifficulty::Normal)
    }

    pub fn difficulty(&self) -> BotDifficulty {
        self.difficulty
    }
}

impl Policy for HeuristicPolicy {
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> Call {
        BidPlanner::choose(ctx)
    }

    fn choose_card(&mut self, ctx: &PlayContext<'_>) -> Card {
        match PlayPlanner::choose_with_reason(ctx, self.difficulty) {
            Some((card, reason)) => {
                log_play_decision(ctx, self.difficulty, card, reason);
                card
            }
            None => {
                let card = ctx.fallback_card();
                log_play_decision(ctx, self.difficulty, card, "fallback_empty_legal");
                card
            }
        }
    }
}

fn log_play_decision(ctx: &PlayContext<'_>, difficulty: BotDifficulty, chosen: Card, reason: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let legal_preview = if ctx.legal.len() <= 6 {
        ctx.legal
            .iter()
            .map(|card| card.to_string())
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} moves", ctx.legal.len())
    };

    event!(
        target: "contree_bot::play",
        Level::DEBUG,
        seat = ?ctx.seat,
        difficulty = difficulty.label(),
        contract = %ctx.contract,
        legal_count = ctx.legal.len(),
        legal_moves = %legal_preview,
        chosen = %chosen,
        trick_cards = ctx.trick.plays().len(),
        reason,
    );
}
