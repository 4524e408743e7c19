//! Game status queries
//!
//! Summarizes the rules engine's termination answers into one value for the
//! shell and the training report.

use serde::Serialize;

use crate::rules::{RulesEngine, Side};

/// Where a game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Side },
    Stalemate,
    InsufficientMaterial,
    /// Any other terminal condition the rules engine reports
    Draw,
}

impl GameStatus {
    pub fn of<R: RulesEngine>(rules: &R, pos: &R::Position) -> Self {
        if !rules.is_game_over(pos) {
            GameStatus::InProgress
        } else if rules.is_checkmate(pos) {
            GameStatus::Checkmate {
                winner: rules.side_to_move(pos).opponent(),
            }
        } else if rules.is_stalemate(pos) {
            GameStatus::Stalemate
        } else if rules.is_insufficient_material(pos) {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Draw
        }
    }

    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    /// Human-readable result line, `None` while the game is running
    pub fn result_message(self) -> Option<String> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Checkmate { winner } => Some(format!("Checkmate! {} wins!", winner.name())),
            GameStatus::Stalemate => Some("Stalemate!".to_string()),
            GameStatus::InsufficientMaterial => {
                Some("Draw by insufficient material!".to_string())
            }
            GameStatus::Draw => Some("Draw!".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardChess;

    fn status(fen: &str) -> GameStatus {
        let rules = StandardChess;
        let pos = rules.from_fen(fen).expect("valid FEN");
        GameStatus::of(&rules, &pos)
    }

    #[test]
    fn test_start_is_in_progress() {
        let rules = StandardChess;
        let status = GameStatus::of(&rules, &rules.initial_position());
        assert_eq!(status, GameStatus::InProgress);
        assert!(!status.is_over());
        assert_eq!(status.result_message(), None);
    }

    #[test]
    fn test_checkmate_names_winner() {
        let status = status("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(status, GameStatus::Checkmate { winner: Side::Black });
        assert_eq!(status.result_message().as_deref(), Some("Checkmate! Black wins!"));
    }

    #[test]
    fn test_stalemate_and_bare_kings() {
        assert_eq!(status("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"), GameStatus::Stalemate);
        assert_eq!(
            status("8/8/4k3/8/8/3K4/8/8 w - - 0 1"),
            GameStatus::InsufficientMaterial
        );
    }

    #[test]
    fn test_seventy_five_move_draw() {
        assert_eq!(status("4k3/8/8/8/8/8/8/R3K3 w - - 150 120"), GameStatus::Draw);
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let json = serde_json::to_string(&GameStatus::Checkmate { winner: Side::White })
            .expect("serializes");
        assert_eq!(json, r#"{"state":"checkmate","winner":"white"}"#);
    }
}
