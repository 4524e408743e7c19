//! Action space resolution
//!
//! Enumerates the legal actions of a position through the rules engine and
//! pairs each engine move with its [`ActionId`]. Always called fresh for every
//! decision; legal actions are never cached across positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};
use crate::rules::RulesEngine;

/// Opaque key for a legal move, unique within one position's legal set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A legal move together with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct LegalAction<M> {
    pub id: ActionId,
    pub mv: M,
}

/// Legal actions of `pos` in the engine's enumeration order
///
/// Empty only for positions without legal moves (checkmate or stalemate).
pub fn legal_actions<R: RulesEngine>(rules: &R, pos: &R::Position) -> Vec<LegalAction<R::Move>> {
    rules
        .legal_moves(pos)
        .into_iter()
        .map(|mv| LegalAction {
            id: ActionId(rules.move_id(&mv)),
            mv,
        })
        .collect()
}

/// Identifiers of the legal actions of `pos`
pub fn legal_action_ids<R: RulesEngine>(rules: &R, pos: &R::Position) -> Vec<ActionId> {
    rules
        .legal_moves(pos)
        .iter()
        .map(|mv| ActionId(rules.move_id(mv)))
        .collect()
}

/// Resolve a requested action string against the legal actions of `pos`
pub fn resolve<R: RulesEngine>(
    rules: &R,
    pos: &R::Position,
    requested: &str,
) -> AgentResult<LegalAction<R::Move>> {
    let mv = rules
        .parse_move(pos, requested)
        .ok_or_else(|| AgentError::InvalidAction {
            action: requested.to_string(),
            fen: rules.to_fen(pos),
        })?;
    Ok(LegalAction {
        id: ActionId(rules.move_id(&mv)),
        mv,
    })
}
