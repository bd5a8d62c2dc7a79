mod metered;
mod seating;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contree_bot::bot::BotDifficulty;
use contree_bot::policy::HeuristicPolicy;
use contree_core::game::{GameError, GameOver, GameState, RoundSummary};
use contree_core::model::player::{Player, PlayerPosition};
use contree_core::policy::{PassivePolicy, Policy};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

pub use metered::DecisionSummary;
use metered::{MeteredPolicy, MetricsHandle};
use seating::SeatRotation;

/// Plays the configured number of self-play games and writes their records.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    rotation: SeatRotation,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rounds_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != 4 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            rotation: SeatRotation::new(config.games.rotate_seats),
            config,
            outputs,
            agents,
        })
    }

    /// Execute every game, streaming one JSONL row per round to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut rows_written = 0usize;
        let mut rounds_played = 0usize;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let outcome = self.play_game(game_index, game_seed)?;
            analytics.record_game(&outcome)?;
            rows_written += write_round_rows(&mut writer, &self.config.run_id, &outcome)?;
            rounds_played += outcome.history.len();
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: self.config.games.count,
            rounds_played,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameOutcome, RunnerError> {
        let seating = self.rotation.for_game(game_index);
        let mut players = Vec::with_capacity(4);
        let mut seats = Vec::with_capacity(4);

        for (seat_idx, agent_idx) in seating.iter().enumerate() {
            let seat = PlayerPosition::from_index(seat_idx).ok_or(RunnerError::InvalidSeating {
                index: seat_idx,
                agent_index: *agent_idx,
            })?;
            let agent = self
                .agents
                .get(*agent_idx)
                .ok_or(RunnerError::InvalidSeating {
                    index: seat_idx,
                    agent_index: *agent_idx,
                })?;
            let (policy, metrics) = MeteredPolicy::new(agent.spawn_policy());
            players.push(Player::autonomous(agent.name.clone(), seat, Box::new(policy)));
            seats.push(SeatAssignment {
                seat,
                agent_name: agent.name.clone(),
                metrics,
            });
        }

        let game_error = |source: GameError| RunnerError::Game { game_index, source };
        let mut game =
            GameState::with_seed(players, game_seed).map_err(|err| game_error(err.into()))?;
        let status = game
            .play_game(
                self.config.games.target_score,
                self.config.games.max_rounds,
                None,
            )
            .map_err(game_error)?;
        let final_scores = game.scores();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "contree_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                game_seed,
                rounds = game.round_number(),
                north_south = final_scores[0],
                east_west = final_scores[1],
                status = ?status,
            );
        }

        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat_label(seat.seat).to_string(),
                bot: seat.agent_name.clone(),
            })
            .collect();
        let seat_results = seats
            .into_iter()
            .map(|seat| SeatResult {
                metrics: seat.metrics.summary(),
                agent_name: seat.agent_name,
                seat: seat.seat,
            })
            .collect();

        Ok(GameOutcome {
            game_index,
            game_seed,
            seating,
            seat_results,
            history: game.history().to_vec(),
            final_scores,
            status,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_round_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{:05}", outcome.game_index);

    let mut rows_written = 0usize;
    for round in &outcome.history {
        let taker = round
            .contract
            .and_then(|contract| outcome.agent_at(contract.player()));
        let row = RoundLogRow {
            run_id,
            game_id: &game_id,
            game_index: outcome.game_index,
            game_seed: outcome.game_seed,
            seating: &outcome.seating,
            taker,
            round,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

fn seat_label(position: PlayerPosition) -> &'static str {
    match position {
        PlayerPosition::North => "north",
        PlayerPosition::East => "east",
        PlayerPosition::South => "south",
        PlayerPosition::West => "west",
    }
}

struct SeatAssignment {
    seat: PlayerPosition,
    agent_name: String,
    metrics: MetricsHandle,
}

/// Everything recorded about one finished (or abandoned) game.
pub struct GameOutcome {
    pub game_index: usize,
    pub game_seed: u64,
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub history: Vec<RoundSummary>,
    pub final_scores: [u32; 2],
    pub status: GameOver,
}

impl GameOutcome {
    pub fn agent_at(&self, seat: PlayerPosition) -> Option<&str> {
        self.seat_results
            .iter()
            .find(|result| result.seat == seat)
            .map(|result| result.agent_name.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: PlayerPosition,
    pub metrics: DecisionSummary,
}

#[derive(Serialize)]
struct RoundLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    game_seed: u64,
    seating: &'a [SeatSnapshot],
    taker: Option<&'a str>,
    #[serde(flatten)]
    round: &'a RoundSummary,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game {game_index} failed: {source}")]
    Game {
        game_index: usize,
        #[source]
        source: GameError,
    },
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("seat index {index} references invalid agent index {agent_index}")]
    InvalidSeating { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid heuristic parameter for agent '{name}': {message}")]
    InvalidHeuristicParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Heuristic(HeuristicOptions),
    Passive,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Heuristic => {
                AgentImplementation::Heuristic(HeuristicOptions::from_params(
                    &config.name,
                    &config.params,
                )?)
            }
            AgentKind::Passive => AgentImplementation::Passive,
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    fn spawn_policy(&self) -> Box<dyn Policy> {
        match &self.implementation {
            AgentImplementation::Heuristic(opts) => Box::new(HeuristicPolicy::new(opts.difficulty)),
            AgentImplementation::Passive => Box::new(PassivePolicy),
        }
    }
}

struct HeuristicOptions {
    difficulty: BotDifficulty,
}

impl HeuristicOptions {
    fn from_params(name: &str, params: &serde_yaml::Value) -> Result<Self, AgentError> {
        if params.is_null() {
            return Ok(Self {
                difficulty: BotDifficulty::from_env(),
            });
        }

        let mapping = params
            .as_mapping()
            .ok_or_else(|| AgentError::InvalidHeuristicParam {
                name: name.to_string(),
                message: "expected mapping for heuristic params".to_string(),
            })?;

        let difficulty_value = mapping
            .iter()
            .find_map(|(key, value)| (key.as_str() == Some("difficulty")).then_some(value));

        let Some(value) = difficulty_value else {
            return Ok(Self {
                difficulty: BotDifficulty::from_env(),
            });
        };

        let text = value
            .as_str()
            .ok_or_else(|| AgentError::InvalidHeuristicParam {
                name: name.to_string(),
                message: "difficulty must be a string".to_string(),
            })?;
        let difficulty =
            BotDifficulty::from_label(text).ok_or_else(|| AgentError::InvalidHeuristicParam {
                name: name.to_string(),
                message: format!("unknown difficulty '{text}'"),
            })?;

        Ok(Self { difficulty })
    }
}
