//! Reward function
//!
//! Scores the position reached after an action, from White's point of view:
//!
//! | Position                     | Reward |
//! |------------------------------|--------|
//! | Black is checkmated          | +100.0 |
//! | White is checkmated          | -100.0 |
//! | Stalemate                    |    0.0 |
//! | Anything else                | material balance (White - Black) |
//!
//! The mate reward is keyed to absolute color rather than to the side that
//! just moved. An agent playing Black therefore learns from White-framed
//! rewards. This asymmetry is kept as-is: changing it changes what the stored
//! Q-values mean.

use crate::rules::{PieceKind, RulesEngine, Side};

pub const CHECKMATE_REWARD: f64 = 100.0;
pub const STALEMATE_REWARD: f64 = 0.0;

/// Material value of a piece
pub fn piece_value(kind: PieceKind) -> f64 {
    match kind {
        PieceKind::Pawn => 1.0,
        PieceKind::Knight | PieceKind::Bishop => 3.0,
        PieceKind::Rook => 5.0,
        PieceKind::Queen => 9.0,
        PieceKind::King => 0.0,
    }
}

/// Sum of White's piece values minus Black's
pub fn material_balance<R: RulesEngine>(rules: &R, pos: &R::Position) -> f64 {
    (0..64u8)
        .filter_map(|square| rules.piece_at(pos, square))
        .map(|(kind, side)| match side {
            Side::White => piece_value(kind),
            Side::Black => -piece_value(kind),
        })
        .sum()
}

/// Reward for arriving at `pos`
pub fn reward<R: RulesEngine>(rules: &R, pos: &R::Position) -> f64 {
    if rules.is_checkmate(pos) {
        // The side to move is the one that has been mated
        match rules.side_to_move(pos) {
            Side::Black => CHECKMATE_REWARD,
            Side::White => -CHECKMATE_REWARD,
        }
    } else if rules.is_stalemate(pos) {
        STALEMATE_REWARD
    } else {
        material_balance(rules, pos)
    }
}
