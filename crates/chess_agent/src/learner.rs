//! One-step tabular Q-learning
//!
//! ```text
//! Q(s, a) <- Q(s, a) + alpha * (r + gamma * max_a' Q(s', a') - Q(s, a))
//! ```
//!
//! `max_a' Q(s', a')` ranges over the legal actions of the next position and is
//! 0.0 when the next position has none. No convergence guarantee is claimed.

use parking_lot::RwLock;

use crate::actions::{legal_action_ids, ActionId};
use crate::encoder::{encode, StateId};
use crate::rules::RulesEngine;
use crate::store::{ActionValues, QTable};

/// Temporal-difference updater
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearner {
    pub learning_rate: f64,
    pub discount_factor: f64,
}

impl QLearner {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }

    /// New value for a pair given its current value, the reward and the best
    /// next-state value
    pub fn updated_value(&self, current: f64, reward: f64, next_max: f64) -> f64 {
        current + self.learning_rate * (reward + self.discount_factor * next_max - current)
    }

    /// Apply the update to `table` given the legal action ids of `next_state`
    pub fn apply(
        &self,
        table: &mut QTable,
        state: &StateId,
        action: &ActionId,
        reward: f64,
        next_state: &StateId,
        next_actions: &[ActionId],
    ) -> f64 {
        let current = table.get(state, action);
        let next_max = next_actions
            .iter()
            .map(|a| table.q_value(next_state, a))
            .reduce(f64::max)
            .unwrap_or(0.0);
        let value = self.updated_value(current, reward, next_max);
        table.set(state, action, value);
        value
    }

    /// Update the shared table for the transition `(state, action, reward, next_pos)`
    ///
    /// Legal actions of the next position are enumerated before the write lock
    /// is taken; the read-modify-write itself happens under the lock.
    pub fn update<R: RulesEngine>(
        &self,
        rules: &R,
        table: &RwLock<QTable>,
        state: &StateId,
        action: &ActionId,
        reward: f64,
        next_pos: &R::Position,
    ) -> f64 {
        let next_state = encode(rules, next_pos);
        let next_actions = legal_action_ids(rules, next_pos);
        let mut table = table.write();
        self.apply(&mut table, state, action, reward, &next_state, &next_actions)
    }
}
