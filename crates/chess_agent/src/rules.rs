//! Chess rules seam
//!
//! The agent never generates moves or detects game termination itself. It
//! consumes those answers from a [`RulesEngine`], which is assumed correct and
//! complete per standard chess rules. [`StandardChess`] is the implementation
//! used by the binaries, backed by `shakmaty`.
//!
//! Positions carry no move history, so repetition draws (threefold claims,
//! automatic fivefold) are not detected. The automatic 75-move draw is.
//!
//! Square indices follow the a1 = 0, b1 = 1, ..., h8 = 63 layout.

use serde::{Deserialize, Serialize};
use shakmaty::fen::{Epd, Fen};
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role, Square};

/// Half-moves without capture or pawn move after which the game is drawn
/// automatically (75-move rule).
pub const AUTOMATIC_DRAW_HALFMOVES: u32 = 150;

/// Side to move / piece owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

/// Piece type without color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Operations the agent requires from a chess rules engine
///
/// Move identifiers returned by [`RulesEngine::move_id`] must be unique within
/// the legal-move set of a position and must parse back through
/// [`RulesEngine::parse_move`] for that same position.
pub trait RulesEngine: Send + Sync + 'static {
    type Position: Clone + Send + Sync + 'static;
    type Move: Clone + Send + Sync + 'static;

    fn initial_position(&self) -> Self::Position;

    /// Legal moves in the engine's enumeration order
    fn legal_moves(&self, pos: &Self::Position) -> Vec<Self::Move>;

    /// Apply a move taken from `legal_moves(pos)`
    fn apply(&self, pos: &Self::Position, mv: &Self::Move) -> Self::Position;

    fn is_game_over(&self, pos: &Self::Position) -> bool;
    fn is_checkmate(&self, pos: &Self::Position) -> bool;
    fn is_stalemate(&self, pos: &Self::Position) -> bool;
    fn is_insufficient_material(&self, pos: &Self::Position) -> bool;
    fn side_to_move(&self, pos: &Self::Position) -> Side;
    fn piece_at(&self, pos: &Self::Position, square: u8) -> Option<(PieceKind, Side)>;

    fn move_id(&self, mv: &Self::Move) -> String;

    /// Parse a move identifier, returning `None` unless it is legal in `pos`
    fn parse_move(&self, pos: &Self::Position, id: &str) -> Option<Self::Move>;

    /// Canonical position text without move counters
    fn position_key(&self, pos: &Self::Position) -> String;

    fn to_fen(&self, pos: &Self::Position) -> String;
    fn from_fen(&self, fen: &str) -> Option<Self::Position>;
}

/// Standard chess rules backed by `shakmaty`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Role> for PieceKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Pawn => PieceKind::Pawn,
            Role::Knight => PieceKind::Knight,
            Role::Bishop => PieceKind::Bishop,
            Role::Rook => PieceKind::Rook,
            Role::Queen => PieceKind::Queen,
            Role::King => PieceKind::King,
        }
    }
}

impl RulesEngine for StandardChess {
    type Position = Chess;
    type Move = Move;

    fn initial_position(&self) -> Chess {
        Chess::default()
    }

    fn legal_moves(&self, pos: &Chess) -> Vec<Move> {
        pos.legal_moves().into_iter().collect()
    }

    fn apply(&self, pos: &Chess, mv: &Move) -> Chess {
        let mut next = pos.clone();
        next.play_unchecked(mv);
        next
    }

    fn is_game_over(&self, pos: &Chess) -> bool {
        pos.is_game_over() || pos.halfmoves() >= AUTOMATIC_DRAW_HALFMOVES
    }

    fn is_checkmate(&self, pos: &Chess) -> bool {
        pos.is_checkmate()
    }

    fn is_stalemate(&self, pos: &Chess) -> bool {
        pos.is_stalemate()
    }

    fn is_insufficient_material(&self, pos: &Chess) -> bool {
        pos.is_insufficient_material()
    }

    fn side_to_move(&self, pos: &Chess) -> Side {
        pos.turn().into()
    }

    fn piece_at(&self, pos: &Chess, square: u8) -> Option<(PieceKind, Side)> {
        if square >= 64 {
            return None;
        }
        pos.board()
            .piece_at(Square::new(u32::from(square)))
            .map(|piece| (piece.role.into(), piece.color.into()))
    }

    fn move_id(&self, mv: &Move) -> String {
        Uci::from_standard(mv).to_string()
    }

    fn parse_move(&self, pos: &Chess, id: &str) -> Option<Move> {
        let uci: Uci = id.trim().parse().ok()?;
        uci.to_move(pos).ok()
    }

    fn position_key(&self, pos: &Chess) -> String {
        Epd::from_position(pos.clone(), EnPassantMode::Legal).to_string()
    }

    fn to_fen(&self, pos: &Chess) -> String {
        Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
    }

    fn from_fen(&self, fen: &str) -> Option<Chess> {
        let fen: Fen = fen.trim().parse().ok()?;
        fen.into_position(CastlingMode::Standard).ok()
    }
}
