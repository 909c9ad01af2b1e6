//! Incremental material + piece-square-table evaluation.
//!
//! The score is kept from White's point of view and updated by the exact delta
//! of each board mutation, so reading it is O(1). Values and tables follow the
//! well-known "simplified evaluation function".

use crate::game_state::chess_types::*;

pub const PAWN_VALUE: Score = 100;
pub const KNIGHT_VALUE: Score = 320;
pub const BISHOP_VALUE: Score = 330;
pub const ROOK_VALUE: Score = 500;
pub const QUEEN_VALUE: Score = 900;
pub const KING_VALUE: Score = 20_000;

// Tables are laid out as printed on a diagram: first row is rank 8.
#[rustfmt::skip]
const PAWN_TABLE: [Score; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [Score; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [Score; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [Score; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [Score; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_TABLE: [Score; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[inline]
pub const fn material_value(piece_type: PieceType) -> Score {
    match piece_type {
        PieceType::Pawn => PAWN_VALUE,
        PieceType::Knight => KNIGHT_VALUE,
        PieceType::Bishop => BISHOP_VALUE,
        PieceType::Rook => ROOK_VALUE,
        PieceType::Queen => QUEEN_VALUE,
        PieceType::King => KING_VALUE,
    }
}

#[inline]
const fn table(piece_type: PieceType) -> &'static [Score; 64] {
    match piece_type {
        PieceType::Pawn => &PAWN_TABLE,
        PieceType::Knight => &KNIGHT_TABLE,
        PieceType::Bishop => &BISHOP_TABLE,
        PieceType::Rook => &ROOK_TABLE,
        PieceType::Queen => &QUEEN_TABLE,
        PieceType::King => &KING_TABLE,
    }
}

/// Material plus positional value of `piece` on `field`, always positive.
#[inline]
pub const fn piece_value(piece: Piece, field: Field) -> Score {
    let file = field.file() as usize;
    let rank = field.rank() as usize;
    let row = match piece.player {
        PlayerColor::White => 7 - rank,
        PlayerColor::Black => rank,
    };
    material_value(piece.piece_type) + table(piece.piece_type)[row * 8 + file]
}

#[inline]
const fn signed_value(piece: Piece, field: Field) -> Score {
    match piece.player {
        PlayerColor::White => piece_value(piece, field),
        PlayerColor::Black => -piece_value(piece, field),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncrementalMaterialAndPstEvaluator {
    score: Score,
}

impl IncrementalMaterialAndPstEvaluator {
    pub fn from_board(board: &[Option<Piece>; 64]) -> Self {
        Self {
            score: Self::estimate_full_board(board),
        }
    }

    /// O(64) reference evaluation from White's point of view.
    pub fn estimate_full_board(board: &[Option<Piece>; 64]) -> Score {
        board
            .iter()
            .zip(Field::ALL)
            .filter_map(|(piece, field)| piece.map(|p| signed_value(p, field)))
            .sum()
    }

    /// Stored score for `player` (negated for Black).
    #[inline]
    pub const fn score(&self, player: PlayerColor) -> Score {
        match player {
            PlayerColor::White => self.score,
            PlayerColor::Black => -self.score,
        }
    }

    #[inline]
    pub fn move_increment(&mut self, piece: Piece, from: Field, to: Field) {
        self.score += signed_value(piece, to) - signed_value(piece, from);
    }

    #[inline]
    pub fn capture_increment(&mut self, captured: Piece, field: Field) {
        self.score -= signed_value(captured, field);
    }

    /// Replace the pawn on `field` by `promoted`.
    #[inline]
    pub fn promotion_increment(&mut self, player: PlayerColor, field: Field, promoted: PieceType) {
        self.score += signed_value(Piece::new(player, promoted), field)
            - signed_value(Piece::new(player, PieceType::Pawn), field);
    }
}
