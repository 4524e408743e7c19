//! Epsilon-greedy action selection
//!
//! A uniform draw `r` in `[0, 1)` decides between exploring and exploiting:
//!
//! - `r < exploration_rate`: a uniformly random legal action. The value store
//!   is not consulted at all on this path.
//! - otherwise: the legal action with the highest stored value, where unseen
//!   actions count as 0.0. When none of the legal actions has a stored value
//!   the state is treated as unseen and a random legal action is returned.
//!
//! Ties on the maximum value go to the action encountered first in the rules
//! engine's enumeration order, so selection is fully determined by the RNG
//! seed and the table contents.

use rand::Rng;

use crate::actions::{legal_actions, LegalAction};
use crate::encoder::encode;
use crate::error::{AgentError, AgentResult};
use crate::rules::RulesEngine;
use crate::store::ActionValues;

/// Pick an action for `pos`
///
/// Fails with [`AgentError::TerminalState`] when `pos` has no legal actions.
pub fn select<R, V, G>(
    rules: &R,
    values: &V,
    pos: &R::Position,
    exploration_rate: f64,
    rng: &mut G,
) -> AgentResult<LegalAction<R::Move>>
where
    R: RulesEngine,
    V: ActionValues + ?Sized,
    G: Rng,
{
    let mut actions = legal_actions(rules, pos);
    if actions.is_empty() {
        return Err(AgentError::TerminalState {
            fen: rules.to_fen(pos),
        });
    }

    let r: f64 = rng.random();
    if r < exploration_rate {
        return Ok(take_random(&mut actions, rng));
    }

    let state = encode(rules, pos);
    let mut best: Option<(usize, f64)> = None;
    let mut any_stored = false;
    for (index, action) in actions.iter().enumerate() {
        let stored = values.stored_value(&state, &action.id);
        any_stored |= stored.is_some();
        let value = stored.unwrap_or(0.0);
        // strict comparison keeps the first action on ties
        let improves = match best {
            None => true,
            Some((_, best_value)) => value > best_value,
        };
        if improves {
            best = Some((index, value));
        }
    }

    match best {
        Some((index, _)) if any_stored => Ok(actions.swap_remove(index)),
        _ => Ok(take_random(&mut actions, rng)),
    }
}

fn take_random<M, G: Rng>(actions: &mut Vec<LegalAction<M>>, rng: &mut G) -> LegalAction<M> {
    let index = rng.random_range(0..actions.len());
    actions.swap_remove(index)
}
