//! Self-play training loop
//!
//! Each episode starts from the initial position and alternates sides with the
//! same policy until the rules engine reports game over or the ply cap is hit:
//!
//! 1. Policy picks an action for the current position (read lock)
//! 2. The rules engine applies it
//! 3. The reward is computed on the resulting position
//! 4. The learner updates `(state, action)` (write lock)
//!
//! Updates inside an episode happen strictly in move order. The table is
//! snapshotted after every `snapshot_interval` completed episodes and once more
//! when the run finishes. The blob is produced under the read lock and written
//! to the sink after the lock is released.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::AgentConfig;
use crate::encoder::encode;
use crate::error::AgentResult;
use crate::learner::QLearner;
use crate::persistence::SnapshotSink;
use crate::policy::select;
use crate::reward::reward;
use crate::rules::{RulesEngine, Side};
use crate::status::GameStatus;
use crate::store::SharedQTable;

/// How a self-play episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    WhiteWins,
    BlackWins,
    Draw,
    /// Stopped by the ply cap before the rules engine reported game over
    Capped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpisodeSummary {
    pub plies: usize,
    pub outcome: EpisodeOutcome,
    /// Distinct states an action was taken from
    pub distinct_states: usize,
}

/// Totals over a training run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrainingReport {
    pub episodes: usize,
    pub plies: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub capped: usize,
    pub snapshots_written: usize,
    pub snapshot_failures: usize,
}

impl TrainingReport {
    fn record(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        self.plies += summary.plies;
        match summary.outcome {
            EpisodeOutcome::WhiteWins => self.white_wins += 1,
            EpisodeOutcome::BlackWins => self.black_wins += 1,
            EpisodeOutcome::Draw => self.draws += 1,
            EpisodeOutcome::Capped => self.capped += 1,
        }
    }
}

/// Drives self-play episodes against the shared table
pub struct SelfPlayTrainer<R: RulesEngine> {
    rules: Arc<R>,
    store: SharedQTable,
    sink: Arc<dyn SnapshotSink>,
    learner: QLearner,
    exploration_rate: f64,
    snapshot_interval: usize,
    max_plies: Option<usize>,
}

impl<R: RulesEngine> SelfPlayTrainer<R> {
    pub fn new(
        rules: Arc<R>,
        store: SharedQTable,
        sink: Arc<dyn SnapshotSink>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            rules,
            store,
            sink,
            learner: config.learner(),
            exploration_rate: config.exploration_rate,
            snapshot_interval: config.snapshot_interval.max(1),
            max_plies: config.max_plies,
        }
    }

    /// Play one game from the initial position, learning after every ply
    pub fn play_episode<G: Rng>(&self, rng: &mut G) -> AgentResult<EpisodeSummary> {
        let rules = self.rules.as_ref();
        let mut pos = rules.initial_position();
        let mut visited = HashSet::new();
        let mut plies = 0;

        let outcome = loop {
            match GameStatus::of(rules, &pos) {
                GameStatus::InProgress => {}
                GameStatus::Checkmate { winner: Side::White } => break EpisodeOutcome::WhiteWins,
                GameStatus::Checkmate { winner: Side::Black } => break EpisodeOutcome::BlackWins,
                _ => break EpisodeOutcome::Draw,
            }
            if self.max_plies.is_some_and(|cap| plies >= cap) {
                break EpisodeOutcome::Capped;
            }

            let action = {
                let table = self.store.read();
                select(rules, &*table, &pos, self.exploration_rate, rng)?
            };
            let state = encode(rules, &pos);
            let next = rules.apply(&pos, &action.mv);
            let r = reward(rules, &next);
            self.learner
                .update(rules, &self.store, &state, &action.id, r, &next);

            visited.insert(state);
            pos = next;
            plies += 1;
        };

        Ok(EpisodeSummary {
            plies,
            outcome,
            distinct_states: visited.len(),
        })
    }

    /// Run `num_episodes` episodes with periodic and final snapshots
    pub fn run<G: Rng>(&self, num_episodes: usize, rng: &mut G) -> TrainingReport {
        let mut report = TrainingReport::default();
        info!("[TRAIN] Starting self-play training for {} episodes", num_episodes);

        for episode in 1..=num_episodes {
            match self.play_episode(rng) {
                Ok(summary) => report.record(&summary),
                Err(e) => {
                    error!("[TRAIN] Episode {} aborted: {}", episode, e);
                    break;
                }
            }

            if episode % self.snapshot_interval == 0 {
                info!("[TRAIN] Completed episode {}/{}", episode, num_episodes);
                self.write_snapshot(&mut report);
            }
        }

        self.write_snapshot(&mut report);
        info!(
            "[TRAIN] Training completed: {} episodes, {} plies, W/B/D/capped {}/{}/{}/{}",
            report.episodes,
            report.plies,
            report.white_wins,
            report.black_wins,
            report.draws,
            report.capped
        );
        report
    }

    fn write_snapshot(&self, report: &mut TrainingReport) {
        let blob = self.store.read().snapshot();
        match blob.and_then(|blob| self.sink.write_snapshot(&blob)) {
            Ok(()) => report.snapshots_written += 1,
            Err(e) => {
                warn!("[SNAPSHOT] Failed to persist table during training: {}", e);
                report.snapshot_failures += 1;
            }
        }
    }
}
