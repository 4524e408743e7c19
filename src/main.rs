use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chess_agent::encoder::encode;
use chess_agent::{ChessAgent, FileSnapshot};
use clap::{Args, Parser, Subcommand};
use qchess::{run_session, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qchess", version, about = "Q-learning chess opponent")]
struct Cli {
    /// Model file (defaults to the one in settings.json)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Fixed RNG seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the agent by self-play
    Train {
        /// Number of self-play games
        #[arg(long, default_value_t = 100)]
        episodes: usize,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Play against the agent in the terminal
    Play {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print table statistics and the best opening moves
    Inspect {
        /// Number of opening moves to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

#[derive(Args, Debug, Default)]
struct Overrides {
    #[arg(long)]
    exploration_rate: Option<f64>,

    #[arg(long)]
    max_plies: Option<usize>,

    /// Write the effective settings back to settings.json
    #[arg(long)]
    save_settings: bool,
}

impl Overrides {
    fn apply(&self, settings: &mut Settings) {
        if let Some(rate) = self.exploration_rate {
            settings.agent.exploration_rate = rate;
        }
        if let Some(plies) = self.max_plies {
            settings.agent.max_plies = Some(plies);
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(model) = &cli.model {
        settings.model_path = model.clone();
    }
    if cli.seed.is_some() {
        settings.agent.seed = cli.seed;
    }
    if let Command::Train { overrides, .. } | Command::Play { overrides } = &cli.command {
        overrides.apply(&mut settings);
        if overrides.save_settings {
            let path = settings.save().context("Failed to save settings")?;
            info!("Settings written to {}", path.display());
        }
    }

    let sink = FileSnapshot::new(&settings.model_path);
    let table = sink.load_or_empty();
    let agent = ChessAgent::new(settings.agent.clone(), table, Arc::new(sink))
        .context("Invalid agent configuration")?;

    match cli.command {
        Command::Train { episodes, .. } => {
            let report = agent.train_blocking(episodes);
            println!(
                "Trained {} episodes ({} plies): {} white wins, {} black wins, {} draws, {} capped",
                report.episodes,
                report.plies,
                report.white_wins,
                report.black_wins,
                report.draws,
                report.capped
            );
            if report.snapshot_failures > 0 {
                error!(
                    "{} of {} snapshots failed",
                    report.snapshot_failures,
                    report.snapshots_written + report.snapshot_failures
                );
            }
        }
        Command::Play { .. } => {
            let stdin = io::stdin();
            let summary = run_session(&agent, stdin.lock(), io::stdout())?;
            info!(
                "Session over: {} games, {} human moves",
                summary.games_started, summary.human_moves
            );
            agent
                .save()
                .with_context(|| format!("Failed to save {}", settings.model_path.display()))?;
        }
        Command::Inspect { top } => {
            let stats = agent.stats();
            println!("Model: {}", settings.model_path.display());
            println!("States: {}", stats.states);
            println!("Entries: {}", stats.entries);

            let start = encode(agent.rules(), &agent.new_game());
            let table = agent.store().read();
            if table.knows_state(&start) {
                println!("Best opening moves:");
                for (action, value) in table.top_actions(&start, top) {
                    println!("  {:<6} {:>10.4}", action, value);
                }
            } else {
                println!("No values learned for the initial position yet");
            }
        }
    }

    Ok(())
}
