//! Agent facade used by the web shell and the CLI
//!
//! [`ChessAgent`] owns the shared Q-table and exposes the operations an outer
//! layer needs: start a game, apply a human move, let the agent reply (and
//! learn from its own move), launch background self-play, and persist or load
//! the table.
//!
//! Positions are owned by the caller and passed in explicitly. The agent keeps
//! no "current game"; two browser tabs can play independent games against the
//! same table.
//!
//! # Concurrency
//!
//! - The Q-table sits behind a `parking_lot::RwLock` shared with every
//!   training run. Policy lookups take the read lock, each learner update
//!   takes the write lock for its whole read-modify-write.
//! - The interactive RNG has its own mutex; training runs get an RNG split off
//!   from it so they never contend for it.
//! - Training runs on Tokio's blocking pool and cannot be cancelled.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::actions::{legal_action_ids, resolve, ActionId};
use crate::config::AgentConfig;
use crate::encoder::encode;
use crate::error::{AgentError, AgentResult};
use crate::persistence::SnapshotSink;
use crate::policy::select;
use crate::reward::reward;
use crate::rules::{RulesEngine, StandardChess};
use crate::status::GameStatus;
use crate::store::{QTable, SharedQTable, TableStats};
use crate::trainer::{SelfPlayTrainer, TrainingReport};

/// The agent's reply to a position
#[derive(Debug, Clone)]
pub struct AgentMove<M, P> {
    pub action: ActionId,
    pub mv: M,
    /// Position after the agent's move
    pub position: P,
    /// Reward observed for the resulting position
    pub reward: f64,
    /// Value stored for the move after learning from it
    pub q_value: f64,
}

/// Table and training activity summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    pub states: usize,
    pub entries: usize,
    pub active_trainings: usize,
}

/// Handle to a background training run
#[derive(Debug)]
pub struct TrainingHandle {
    id: Uuid,
    handle: JoinHandle<TrainingReport>,
}

impl TrainingHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the run to complete
    pub async fn join(self) -> Result<TrainingReport, JoinError> {
        self.handle.await
    }
}

/// Decrements the active-training counter when a run ends, even by panic
struct ActiveRun(Arc<AtomicUsize>);

impl ActiveRun {
    fn start(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Q-learning chess opponent
pub struct ChessAgent<R: RulesEngine = StandardChess> {
    rules: Arc<R>,
    store: SharedQTable,
    sink: Arc<dyn SnapshotSink>,
    config: AgentConfig,
    rng: Mutex<StdRng>,
    active_trainings: Arc<AtomicUsize>,
}

impl ChessAgent<StandardChess> {
    /// Agent playing standard chess
    pub fn new(
        config: AgentConfig,
        table: QTable,
        sink: Arc<dyn SnapshotSink>,
    ) -> AgentResult<Self> {
        Self::with_rules(StandardChess, config, table, sink)
    }
}

impl<R: RulesEngine> ChessAgent<R> {
    pub fn with_rules(
        rules: R,
        config: AgentConfig,
        table: QTable,
        sink: Arc<dyn SnapshotSink>,
    ) -> AgentResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            rules: Arc::new(rules),
            store: table.shared(),
            sink,
            config,
            rng: Mutex::new(rng),
            active_trainings: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedQTable {
        &self.store
    }

    /// Initial position of a fresh game
    pub fn new_game(&self) -> R::Position {
        self.rules.initial_position()
    }

    /// Identifiers of the legal moves in `pos`
    pub fn legal_moves(&self, pos: &R::Position) -> Vec<ActionId> {
        legal_action_ids(self.rules.as_ref(), pos)
    }

    pub fn status(&self, pos: &R::Position) -> GameStatus {
        GameStatus::of(self.rules.as_ref(), pos)
    }

    /// Apply a human move given by its identifier
    ///
    /// The input position is left untouched when the move is rejected.
    pub fn apply_human_move(&self, pos: &R::Position, move_id: &str) -> AgentResult<R::Position> {
        let action = resolve(self.rules.as_ref(), pos, move_id)?;
        debug!("[AGENT] Human played {}", action.id);
        Ok(self.rules.apply(pos, &action.mv))
    }

    /// Pick, play and learn from the agent's move in `pos`
    ///
    /// Fails with [`AgentError::TerminalState`] when the game is already over.
    pub fn agent_respond(&self, pos: &R::Position) -> AgentResult<AgentMove<R::Move, R::Position>> {
        let rules = self.rules.as_ref();
        if self.status(pos).is_over() {
            return Err(AgentError::TerminalState {
                fen: rules.to_fen(pos),
            });
        }

        let state = encode(rules, pos);
        let action = {
            let table = self.store.read();
            let mut rng = self.rng.lock();
            select(rules, &*table, pos, self.config.exploration_rate, &mut *rng)?
        };
        let next = rules.apply(pos, &action.mv);
        let r = reward(rules, &next);
        let q_value = self
            .config
            .learner()
            .update(rules, &self.store, &state, &action.id, r, &next);
        debug!(
            "[AGENT] Replied {} (reward {:.1}, value {:.4})",
            action.id, r, q_value
        );

        Ok(AgentMove {
            action: action.id,
            mv: action.mv,
            position: next,
            reward: r,
            q_value,
        })
    }

    fn trainer(&self) -> SelfPlayTrainer<R> {
        SelfPlayTrainer::new(
            self.rules.clone(),
            self.store.clone(),
            self.sink.clone(),
            &self.config,
        )
    }

    fn training_rng(&self) -> StdRng {
        StdRng::from_rng(&mut *self.rng.lock())
    }

    /// Launch self-play training on Tokio's blocking pool
    ///
    /// Must be called from within a Tokio runtime. The returned handle may be
    /// dropped; the run continues and persists its snapshots regardless.
    pub fn start_training(&self, num_episodes: usize) -> TrainingHandle {
        let id = Uuid::new_v4();
        let trainer = self.trainer();
        let mut rng = self.training_rng();
        let active = ActiveRun::start(self.active_trainings.clone());

        info!("[TRAIN] Spawning training run {} ({} episodes)", id, num_episodes);
        let handle = tokio::task::spawn_blocking(move || {
            let _active = active;
            let span = info_span!("training", %id);
            let _enter = span.enter();
            trainer.run(num_episodes, &mut rng)
        });

        TrainingHandle { id, handle }
    }

    /// Run self-play training on the current thread
    pub fn train_blocking(&self, num_episodes: usize) -> TrainingReport {
        let _active = ActiveRun::start(self.active_trainings.clone());
        let mut rng = self.training_rng();
        self.trainer().run(num_episodes, &mut rng)
    }

    /// Serialize the full table
    pub fn persist(&self) -> AgentResult<Vec<u8>> {
        self.store.read().snapshot()
    }

    /// Replace the table with a previously persisted one
    pub fn load(&self, blob: &[u8]) -> AgentResult<TableStats> {
        let table = QTable::restore(blob)?;
        let stats = table.stats();
        *self.store.write() = table;
        info!(
            "[AGENT] Loaded table with {} states / {} entries",
            stats.states, stats.entries
        );
        Ok(stats)
    }

    /// Write the table to the configured snapshot sink
    pub fn save(&self) -> AgentResult<()> {
        let blob = self.persist()?;
        self.sink.write_snapshot(&blob)
    }

    pub fn stats(&self) -> AgentStats {
        let TableStats { states, entries } = self.store.read().stats();
        AgentStats {
            states,
            entries,
            active_trainings: self.active_trainings.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::NullSink;
    use crate::rules::Side;

    fn agent(exploration_rate: f64) -> ChessAgent {
        let config = AgentConfig {
            exploration_rate,
            seed: Some(17),
            max_plies: Some(20),
            ..AgentConfig::default()
        };
        ChessAgent::new(config, QTable::new(), Arc::new(NullSink)).expect("valid config")
    }

    #[test]
    fn test_new_game_is_initial_position() {
        let agent = agent(0.3);
        let pos = agent.new_game();
        assert_eq!(agent.legal_moves(&pos).len(), 20);
        assert_eq!(agent.status(&pos), GameStatus::InProgress);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AgentConfig {
            discount_factor: -0.1,
            ..AgentConfig::default()
        };
        let result = ChessAgent::new(config, QTable::new(), Arc::new(NullSink));
        assert!(matches!(result, Err(AgentError::Config { .. })));
    }

    #[test]
    fn test_human_move_then_agent_reply() {
        let agent = agent(0.3);
        let start = agent.new_game();
        let after_human = agent.apply_human_move(&start, "e2e4").expect("legal");
        assert_eq!(agent.rules().side_to_move(&after_human), Side::Black);

        let reply = agent.agent_respond(&after_human).expect("agent moves");
        assert_eq!(agent.rules().side_to_move(&reply.position), Side::White);

        // The transition was learned against the position before the reply
        let state = encode(agent.rules(), &after_human);
        let stored = agent.store().read().get(&state, &reply.action);
        assert_eq!(stored, reply.q_value);
        assert_eq!(agent.stats().entries, 1);
    }

    #[test]
    fn test_rejected_human_move_leaves_position() {
        let agent = agent(0.3);
        let start = agent.new_game();
        let err = agent.apply_human_move(&start, "e2e5").unwrap_err();
        assert!(matches!(err, AgentError::InvalidAction { .. }));
        assert_eq!(agent.rules().to_fen(&start), agent.rules().to_fen(&agent.new_game()));
    }

    #[test]
    fn test_agent_refuses_finished_game() {
        let agent = agent(0.3);
        let mated = agent
            .rules()
            .from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .expect("valid");
        let err = agent.agent_respond(&mated).unwrap_err();
        assert!(matches!(err, AgentError::TerminalState { .. }));
    }

    #[test]
    fn test_persist_and_load_round_trip() {
        let agent = agent(1.0);
        agent.train_blocking(2);
        let before = agent.store().read().clone();
        let blob = agent.persist().expect("persists");

        let other = self::agent(0.3);
        let stats = other.load(&blob).expect("loads");
        assert_eq!(stats, before.stats());
        assert_eq!(*other.store().read(), before);
    }

    #[test]
    fn test_bad_blob_keeps_existing_table() {
        let agent = agent(1.0);
        agent.train_blocking(1);
        let before = agent.stats();
        assert!(agent.load(b"garbage").is_err());
        assert_eq!(agent.stats(), before);
    }

    #[tokio::test]
    async fn test_background_training_reports() {
        let agent = agent(0.3);
        let handle = agent.start_training(3);
        let report = handle.join().await.expect("training task");
        assert_eq!(report.episodes, 3);
        assert_eq!(agent.stats().active_trainings, 0);
        assert!(agent.stats().states > 0);
    }
}
