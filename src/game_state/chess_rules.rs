//! Canonical chess-rule constants.
//!
//! Starting position, home squares for castling and the pawn ranks used by
//! board mutation, move generation and hashing.

use crate::game_state::chess_types::{Field, PlayerColor};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[inline]
pub const fn king_home(player: PlayerColor) -> Field {
    match player {
        PlayerColor::White => Field::E1,
        PlayerColor::Black => Field::E8,
    }
}

#[inline]
pub const fn short_rook_home(player: PlayerColor) -> Field {
    match player {
        PlayerColor::White => Field::H1,
        PlayerColor::Black => Field::H8,
    }
}

#[inline]
pub const fn long_rook_home(player: PlayerColor) -> Field {
    match player {
        PlayerColor::White => Field::A1,
        PlayerColor::Black => Field::A8,
    }
}

/// Rank a pawn starts on (zero-based).
#[inline]
pub const fn pawn_start_rank(player: PlayerColor) -> u8 {
    match player {
        PlayerColor::White => 1,
        PlayerColor::Black => 6,
    }
}

/// Rank a pawn promotes on (zero-based).
#[inline]
pub const fn promotion_rank(player: PlayerColor) -> u8 {
    match player {
        PlayerColor::White => 7,
        PlayerColor::Black => 0,
    }
}

/// Rook `(from, to)` implied by a castling king landing on `king_to`.
pub const fn castling_rook_move(king_to: Field) -> Option<(Field, Field)> {
    match king_to {
        Field::G1 => Some((Field::H1, Field::F1)),
        Field::C1 => Some((Field::A1, Field::D1)),
        Field::G8 => Some((Field::H8, Field::F8)),
        Field::C8 => Some((Field::A8, Field::D8)),
        _ => None,
    }
}
