use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use contree_core::model::bid::Call;
use contree_core::model::card::Card;
use contree_core::policy::{BidContext, PlayContext, Policy};

#[derive(Debug, Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn summary(&self) -> DecisionSummary {
        let total_ms = self.total.as_secs_f64() * 1000.0;
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            total_ms / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

/// Read side of a [`MeteredPolicy`], kept by the runner after the policy
/// moves into the game.
#[derive(Clone, Default)]
pub(super) struct MetricsHandle(Arc<Mutex<DecisionMetrics>>);

impl MetricsHandle {
    pub(super) fn summary(&self) -> DecisionSummary {
        self.0
            .lock()
            .map(|metrics| metrics.summary())
            .unwrap_or_default()
    }
}

/// Times every bid and card decision of the wrapped policy.
pub(super) struct MeteredPolicy {
    inner: Box<dyn Policy>,
    metrics: MetricsHandle,
}

impl MeteredPolicy {
    pub(super) fn new(inner: Box<dyn Policy>) -> (Self, MetricsHandle) {
        let metrics = MetricsHandle::default();
        let policy = Self {
            inner,
            metrics: metrics.clone(),
        };
        (policy, metrics)
    }

    fn record(&self, elapsed: Duration) {
        if let Ok(mut metrics) = self.metrics.0.lock() {
            metrics.record(elapsed);
        }
    }
}

impl Policy for MeteredPolicy {
    fn choose_bid(&mut self, ctx: &BidContext<'_>) -> Call {
        let start = Instant::now();
        let call = self.inner.choose_bid(ctx);
        self.record(start.elapsed());
        call
    }

    fn choose_card(&mut self, ctx: &PlayContext<'_>) -> Card {
        let start = Instant::now();
        let card = self.inner.choose_card(ctx);
        self.record(start.elapsed());
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contree_core::model::hand::Hand;
    use contree_core::model::player::PlayerPosition;
    use contree_core::policy::PassivePolicy;

    #[test]
    fn counts_each_decision() {
        let (mut policy, handle) = MeteredPolicy::new(Box::new(PassivePolicy));
        let hand = Hand::new();
        let ctx = BidContext {
            seat: PlayerPosition::South,
            hand: &hand,
            history: &[],
        };
        assert_eq!(policy.choose_bid(&ctx), Call::Pass);
        assert_eq!(policy.choose_bid(&ctx), Call::Pass);

        let summary = handle.summary();
        assert_eq!(summary.decisions, 2);
        assert!(summary.total_ms >= 0.0);
    }

    #[test]
    fn fresh_handle_reports_zero() {
        let summary = MetricsHandle::default().summary();
        assert_eq!(summary, DecisionSummary::default());
    }
}
