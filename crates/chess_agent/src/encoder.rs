//! Position encoding
//!
//! Maps a board position to the canonical [`StateId`] used as the outer key of
//! the Q-table. Two positions with identical placement, side to move, castling
//! rights and en-passant target produce identical identifiers; move counters
//! are not part of the key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::RulesEngine;

/// Opaque canonical key for a board position
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a position as its state identifier
pub fn encode<R: RulesEngine>(rules: &R, pos: &R::Position) -> StateId {
    StateId(rules.position_key(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardChess;

    #[test]
    fn test_encode_is_deterministic() {
        let rules = StandardChess;
        let pos = rules.initial_position();
        assert_eq!(encode(&rules, &pos), encode(&rules, &pos));
    }

    #[test]
    fn test_encode_distinguishes_side_to_move() {
        let rules = StandardChess;
        let white = rules
            .from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
            .expect("valid");
        let black = rules
            .from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1")
            .expect("valid");
        assert_ne!(encode(&rules, &white), encode(&rules, &black));
    }

    #[test]
    fn test_transposition_shares_identifier() {
        //! Nf3 Nf6 Ng1 Ng8 returns to the start placement with fresh counters ignored
        let rules = StandardChess;
        let start = rules.initial_position();
        let mut pos = start.clone();
        for id in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = rules.parse_move(&pos, id).expect("legal");
            pos = rules.apply(&pos, &mv);
        }
        assert_eq!(encode(&rules, &pos), encode(&rules, &start));
    }
}
