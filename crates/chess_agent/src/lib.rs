//! Tabular Q-learning chess opponent
//!
//! A one-ply, reactive agent that learns move preferences from self-play and
//! from the games it plays against humans. Legal move generation and game
//! termination come from a [`RulesEngine`]; everything else lives here.
//!
//! ## Module Organization
//!
//! - `rules` - Rules-engine seam and the `shakmaty`-backed standard chess
//! - `encoder` - Position to [`StateId`]
//! - `actions` - Legal actions and [`ActionId`] resolution
//! - `store` - The Q-table and its snapshot format
//! - `policy` - Epsilon-greedy selection
//! - `reward` - Reward shaping
//! - `learner` - Q-learning update
//! - `trainer` - Self-play training loop
//! - `persistence` - Snapshot sinks and model files
//! - `agent` - Facade used by the web shell and the CLI
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chess_agent::{AgentConfig, ChessAgent, FileSnapshot};
//!
//! let sink = FileSnapshot::new("chess_rl_model.json");
//! let table = sink.load_or_empty();
//! let agent = ChessAgent::new(AgentConfig::default(), table, Arc::new(sink))?;
//!
//! let pos = agent.new_game();
//! let pos = agent.apply_human_move(&pos, "e2e4")?;
//! let reply = agent.agent_respond(&pos)?;
//! println!("agent played {}", reply.action);
//! # Ok::<(), chess_agent::AgentError>(())
//! ```

pub mod actions;
pub mod agent;
pub mod config;
pub mod encoder;
pub mod error;
pub mod learner;
pub mod persistence;
pub mod policy;
pub mod reward;
pub mod rules;
pub mod status;
pub mod store;
pub mod trainer;

pub use actions::{ActionId, LegalAction};
pub use agent::{AgentMove, AgentStats, ChessAgent, TrainingHandle};
pub use config::AgentConfig;
pub use encoder::StateId;
pub use error::{AgentError, AgentResult};
pub use learner::QLearner;
pub use persistence::{FileSnapshot, NullSink, SnapshotSink, DEFAULT_MODEL_FILE};
pub use rules::{PieceKind, RulesEngine, Side, StandardChess};
pub use status::GameStatus;
pub use store::{QTable, SharedQTable, TableStats};
pub use trainer::{EpisodeOutcome, EpisodeSummary, SelfPlayTrainer, TrainingReport};
