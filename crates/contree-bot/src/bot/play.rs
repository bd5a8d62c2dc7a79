use super::{BotDifficulty, card_sort_key};
use contree_core::model::card::Card;
use contree_core::model::rank::Rank;
use contree_core::model::suit::Suit;
use contree_core::policy::PlayContext;

pub struct PlayPlanner;

impl PlayPlanner {
    pub fn choose(ctx: &PlayContext<'_>, difficulty: BotDifficulty) -> Option<Card> {
        Self::choose_with_reason(ctx, difficulty).map(|(card, _)| card)
    }

    /// Picks a legal card and names the rule that chose it.
    pub fn choose_with_reason(
        ctx: &PlayContext<'_>,
        difficulty: BotDifficulty,
    ) -> Option<(Card, &'static str)> {
        let first = *ctx.legal.first()?;
        if difficulty == BotDifficulty::Easy {
            return Some((first, "easy_first_legal"));
        }

        let trump = ctx.contract.trump();
        if ctx.trick.is_empty() {
            return lead(ctx, trump);
        }

        if ctx.trick.current_winner() == Some(ctx.seat.partner()) {
            return cheapest(ctx.legal, trump).map(|card| (card, "partner_holds"));
        }

        let cheapest_winner = ctx
            .legal
            .iter()
            .copied()
            .filter(|card| takes_trick(ctx, *card))
            .min_by_key(|card| (card.is_trump(trump), card.order(trump), card_sort_key(*card)));
        if let Some(card) = cheapest_winner {
            return Some((card, "win_cheaply"));
        }
        cheapest(ctx.legal, trump).map(|card| (card, "discard"))
    }
}

fn lead(ctx: &PlayContext<'_>, trump: Option<Suit>) -> Option<(Card, &'static str)> {
    let side_ace = ctx
        .legal
        .iter()
        .copied()
        .filter(|card| card.rank == Rank::Ace && !card.is_trump(trump))
        .min_by_key(|card| card_sort_key(*card));
    if let Some(card) = side_ace {
        return Some((card, "lead_ace"));
    }

    let attacking = ctx.contract.team() == ctx.seat.team();
    if let Some(suit) = trump {
        let master = Card::new(Rank::Jack, suit);
        if attacking && ctx.legal.contains(&master) {
            return Some((master, "draw_trumps"));
        }
    }

    cheapest(ctx.legal, trump).map(|card| (card, "lead_low"))
}

fn takes_trick(ctx: &PlayContext<'_>, card: Card) -> bool {
    let mut trial = ctx.trick.clone();
    trial.play(ctx.seat, card).is_ok() && trial.current_winner() == Some(ctx.seat)
}

/// Lowest-point card, keeping trumps when points tie.
fn cheapest(legal: &[Card], trump: Option<Suit>) -> Option<Card> {
    legal.iter().copied().min_by_key(|card| {
        (
            card.points(trump),
            card.is_trump(trump),
            card.order(trump),
            card_sort_key(*card),
        )
    })
}
