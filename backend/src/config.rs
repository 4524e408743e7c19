//! Server configuration
//!
//! Every option can come from the command line or from the environment
//! (optionally loaded from a `.env` file). Unset hyperparameters keep the
//! agent defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use chess_agent::{AgentConfig, DEFAULT_MODEL_FILE};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "backend", about = "Web server for the Q-learning chess opponent")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "QCHESS_ADDR", default_value = "0.0.0.0:5001")]
    pub addr: SocketAddr,

    /// Model snapshot loaded at startup and written during training
    #[arg(long, env = "QCHESS_MODEL", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    #[arg(long, env = "QCHESS_LEARNING_RATE")]
    pub learning_rate: Option<f64>,

    #[arg(long, env = "QCHESS_DISCOUNT_FACTOR")]
    pub discount_factor: Option<f64>,

    #[arg(long, env = "QCHESS_EXPLORATION_RATE")]
    pub exploration_rate: Option<f64>,

    /// Ply cap per self-play episode
    #[arg(long, env = "QCHESS_MAX_PLIES")]
    pub max_plies: Option<usize>,

    /// Fixed RNG seed for reproducible play
    #[arg(long, env = "QCHESS_SEED")]
    pub seed: Option<u64>,
}

impl ServerArgs {
    /// Agent configuration with command-line overrides applied
    pub fn agent_config(&self) -> AgentConfig {
        let defaults = AgentConfig::default();
        AgentConfig {
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            discount_factor: self.discount_factor.unwrap_or(defaults.discount_factor),
            exploration_rate: self.exploration_rate.unwrap_or(defaults.exploration_rate),
            max_plies: self.max_plies.or(defaults.max_plies),
            seed: self.seed,
            ..defaults
        }
    }
}
