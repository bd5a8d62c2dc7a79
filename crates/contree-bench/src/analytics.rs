use std::collections::HashMap;
use std::fs;
use std::path::Path;

use contree_core::game::GameOver;
use serde::Serialize;
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::tournament::GameOutcome;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Folds game outcomes into per-agent standings.
pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    target_score: u32,
    games: usize,
    unfinished: usize,
    rounds: usize,
    redeals: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let agents = config
            .agents
            .iter()
            .map(|agent| (agent.name.clone(), AgentAccumulator::new(agent)))
            .collect();
        let agent_order = config.agents.iter().map(|a| a.name.clone()).collect();

        Self {
            agents,
            agent_order,
            target_score: config.games.target_score,
            games: 0,
            unfinished: 0,
            rounds: 0,
            redeals: 0,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        self.games += 1;
        let (winner, tied) = match &outcome.status {
            GameOver::Winner(team) => (Some(*team), false),
            GameOver::Tie(_) => (None, true),
            GameOver::InProgress => {
                self.unfinished += 1;
                (None, false)
            }
        };

        for seat in &outcome.seat_results {
            let team = seat.seat.team();
            let acc = self.accumulator(&seat.agent_name)?;
            acc.games += 1;
            acc.total_final_score += u64::from(outcome.final_scores[team.index()]);
            if winner == Some(team) {
                acc.wins += 1;
            }
            if tied {
                acc.ties += 1;
            }
            acc.total_latency_ms += seat.metrics.total_ms;
            acc.total_decisions += u64::from(seat.metrics.decisions);
        }

        for round in &outcome.history {
            self.rounds += 1;
            let Some(contract) = round.contract else {
                self.redeals += 1;
                continue;
            };
            let Some(taker) = outcome.agent_at(contract.player()) else {
                continue;
            };
            let acc = self.accumulator(taker)?;
            acc.contracts_taken += 1;
            if round.score.contract_made == Some(true) {
                acc.contracts_made += 1;
            }
            if contract.is_doubled() {
                acc.contracts_doubled += 1;
            }
        }

        Ok(())
    }

    fn accumulator(&mut self, name: &str) -> Result<&mut AgentAccumulator, AnalyticsError> {
        self.agents
            .get_mut(name)
            .ok_or_else(|| AnalyticsError::UnknownAgent(name.to_string()))
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let agents = self
            .agent_order
            .iter()
            .filter_map(|name| self.agents.remove(name))
            .map(AgentAccumulator::into_report)
            .collect();

        AnalyticsSummary {
            target_score: self.target_score,
            games: self.games,
            unfinished: self.unfinished,
            rounds: self.rounds,
            redeals: self.redeals,
            agents,
        }
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    games: u32,
    wins: u32,
    ties: u32,
    total_final_score: u64,
    contracts_taken: u32,
    contracts_made: u32,
    contracts_doubled: u32,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(config: &AgentConfig) -> Self {
        Self {
            config: config.clone(),
            games: 0,
            wins: 0,
            ties: 0,
            total_final_score: 0,
            contracts_taken: 0,
            contracts_made: 0,
            contracts_doubled: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn into_report(self) -> AgentReport {
        let avg_final_score = if self.games == 0 {
            0.0
        } else {
            self.total_final_score as f64 / f64::from(self.games)
        };
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.config.name,
            kind: self.config.kind,
            games: self.games,
            wins: self.wins,
            ties: self.ties,
            avg_final_score,
            contracts_taken: self.contracts_taken,
            contracts_made: self.contracts_made,
            contracts_doubled: self.contracts_doubled,
            average_ms_per_decision: avg_latency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub games: u32,
    pub wins: u32,
    pub ties: u32,
    pub avg_final_score: f64,
    pub contracts_taken: u32,
    pub contracts_made: u32,
    /// Contracts this agent took that the defenders doubled.
    pub contracts_doubled: u32,
    pub average_ms_per_decision: f64,
}

impl AgentReport {
    pub fn win_rate(&self) -> f64 {
        ratio(self.wins, self.games)
    }

    pub fn make_rate(&self) -> f64 {
        ratio(self.contracts_made, self.contracts_taken)
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub target_score: u32,
    pub games: usize,
    /// Games stopped by the round limit before reaching the target.
    pub unfinished: usize,
    pub rounds: usize,
    pub redeals: usize,
    pub agents: Vec<AgentReport>,
}

impl AnalyticsSummary {
    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Self-play Summary\n\n");
        rows.push_str(&format!(
            "{} games to {} points, {} rounds ({} redeals), {} unfinished\n\n",
            self.games, self.target_score, self.rounds, self.redeals, self.unfinished
        ));
        rows.push_str("| Agent | Kind | Games | Win % | Ties | Avg final score | Contracts | Made % | Doubled | Avg ms/decision |\n");
        rows.push_str("|-------|------|-------|-------|------|-----------------|-----------|--------|---------|-----------------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {win:.1}% | {ties} | {score:.1} | {taken} | {made:.1}% | {doubled} | {latency:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                win = agent.win_rate() * 100.0,
                ties = agent.ties,
                score = agent.avg_final_score,
                taken = agent.contracts_taken,
                made = agent.make_rate() * 100.0,
                doubled = agent.contracts_doubled,
                latency = agent.average_ms_per_decision,
            ));
        }

        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{DecisionSummary, SeatResult};
    use contree_core::game::RoundSummary;
    use contree_core::model::bid::{Bid, ContractBid};
    use contree_core::model::contract::Contract;
    use contree_core::model::player::PlayerPosition;
    use contree_core::model::score::RoundScore;
    use contree_core::model::strain::Strain;
    use contree_core::model::team::TeamId;

    const YAML: &str = r#"
run_id: "analytics"
games:
  count: 1
agents:
  - { name: "a", kind: "heuristic" }
  - { name: "b", kind: "heuristic" }
  - { name: "c", kind: "passive" }
  - { name: "d", kind: "passive" }
outputs:
  jsonl: "rounds.jsonl"
  summary_md: "summary.md"
"#;

    fn config() -> BenchmarkConfig {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(YAML).expect("parse");
        cfg.validate().expect("valid");
        cfg
    }

    fn outcome() -> GameOutcome {
        let seat_results = ["a", "b", "c", "d"]
            .iter()
            .zip(PlayerPosition::LOOP)
            .map(|(name, seat)| SeatResult {
                agent_name: name.to_string(),
                seat,
                metrics: DecisionSummary {
                    decisions: 10,
                    avg_ms_per_decision: 0.5,
                    total_ms: 5.0,
                },
            })
            .collect();
        let contract = Contract::new(
            ContractBid::new(100, Strain::Hearts).unwrap(),
            PlayerPosition::North,
            true,
            false,
        );
        let made = RoundScore {
            contract_made: Some(true),
            scores: [360, 0],
            ..RoundScore::default()
        };
        let history = vec![
            RoundSummary {
                round_number: 1,
                dealer: PlayerPosition::West,
                bids: vec![Bid::pass(PlayerPosition::South); 4],
                contract: None,
                score: RoundScore::redeal(),
                totals: [0, 0],
            },
            RoundSummary {
                round_number: 2,
                dealer: PlayerPosition::North,
                bids: Vec::new(),
                contract: Some(contract),
                score: made,
                totals: [360, 0],
            },
        ];

        GameOutcome {
            game_index: 0,
            game_seed: 1,
            seating: Vec::new(),
            seat_results,
            history,
            final_scores: [360, 0],
            status: GameOver::Winner(TeamId::NorthSouth),
        }
    }

    #[test]
    fn standings_credit_both_partners_and_the_taker() {
        let mut collector = AnalyticsCollector::new(&config());
        collector.record_game(&outcome()).unwrap();
        let summary = collector.finalize();

        assert_eq!(summary.games, 1);
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.redeals, 1);
        let names: Vec<&str> = summary.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);

        let north = &summary.agents[0];
        assert_eq!(north.wins, 1);
        assert_eq!(north.contracts_taken, 1);
        assert_eq!(north.contracts_doubled, 1);
        assert!((north.make_rate() - 1.0).abs() < f64::EPSILON);
        assert!((north.average_ms_per_decision - 0.5).abs() < 1e-9);
        assert_eq!(summary.agents[2].wins, 1);
        assert_eq!(summary.agents[1].wins, 0);
        assert_eq!(summary.agents[1].contracts_taken, 0);

        let markdown = summary.render_markdown();
        assert!(markdown.contains("| a | Heuristic | 1 | 100.0% |"));
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let mut outcome = outcome();
        outcome.seat_results[0].agent_name = "ghost".to_string();
        let mut collector = AnalyticsCollector::new(&config());
        let err = collector.record_game(&outcome).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownAgent(name) if name == "ghost"));
    }
}
