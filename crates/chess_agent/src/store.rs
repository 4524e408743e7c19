//! Q-value store
//!
//! Maps a [`StateId`] to the values of the actions tried from it. A missing
//! entry is semantically 0.0, so the table grows lazily and is never pruned.
//!
//! The store is the single process-wide mutable resource. Callers share it as
//! [`SharedQTable`] and hold the write lock across each get-compute-set
//! sequence.
//!
//! # Snapshot format
//!
//! ```json
//! {"version": 1, "saved_at": "2026-01-01T00:00:00Z", "table": {"<state>": {"e2e4": 0.5}}}
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::actions::ActionId;
use crate::encoder::StateId;
use crate::error::{AgentError, AgentResult};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Q-table shared between the web shell and background training
pub type SharedQTable = Arc<RwLock<QTable>>;

/// Read access to learned action values
pub trait ActionValues {
    /// Stored value, `None` when the pair was never written
    fn stored_value(&self, state: &StateId, action: &ActionId) -> Option<f64>;

    /// Value of the pair, 0.0 when unseen
    fn q_value(&self, state: &StateId, action: &ActionId) -> f64 {
        self.stored_value(state, action).unwrap_or(0.0)
    }
}

/// Tabular mapping from state to per-action values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<StateId, HashMap<ActionId, f64>>,
}

/// Size summary of a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub states: usize,
    pub entries: usize,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    table: &'a HashMap<StateId, HashMap<ActionId, f64>>,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    table: HashMap<StateId, HashMap<ActionId, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedQTable {
        Arc::new(RwLock::new(self))
    }

    pub fn get(&self, state: &StateId, action: &ActionId) -> f64 {
        self.q_value(state, action)
    }

    /// Write a value, creating the state's action map if absent
    pub fn set(&mut self, state: &StateId, action: &ActionId, value: f64) {
        self.values
            .entry(state.clone())
            .or_default()
            .insert(action.clone(), value);
    }

    /// Whether any action has been stored for `state`
    pub fn knows_state(&self, state: &StateId) -> bool {
        self.values.get(state).is_some_and(|actions| !actions.is_empty())
    }

    /// Actions stored for `state`, highest value first
    pub fn top_actions(&self, state: &StateId, limit: usize) -> Vec<(ActionId, f64)> {
        let mut ranked: Vec<(ActionId, f64)> = self
            .values
            .get(state)
            .map(|actions| actions.iter().map(|(a, v)| (a.clone(), *v)).collect())
            .unwrap_or_default();
        ranked.sort_by(|(a1, v1), (a2, v2)| v2.total_cmp(v1).then_with(|| a1.cmp(a2)));
        ranked.truncate(limit);
        ranked
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            states: self.values.len(),
            entries: self.values.values().map(HashMap::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize the full table as a versioned JSON blob
    pub fn snapshot(&self) -> AgentResult<Vec<u8>> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            table: &self.values,
        };
        Ok(serde_json::to_vec(&snapshot)?)
    }

    /// Rebuild a table from a blob produced by [`QTable::snapshot`]
    pub fn restore(blob: &[u8]) -> AgentResult<Self> {
        let header: SnapshotHeader = serde_json::from_slice(blob)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(AgentError::UnsupportedSnapshotVersion {
                found: header.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let owned: SnapshotOwned = serde_json::from_slice(blob)?;
        Ok(Self {
            values: owned.table,
        })
    }
}

impl ActionValues for QTable {
    fn stored_value(&self, state: &StateId, action: &ActionId) -> Option<f64> {
        self.values.get(state)?.get(action).copied()
    }
}
