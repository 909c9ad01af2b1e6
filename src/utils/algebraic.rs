//! Field conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and [`Field`]
//! values reused by FEN parsing, book conversion and tests.

use crate::game_state::chess_types::{BitBoard, Field};

/// Convert algebraic notation (for example: "e4") to a field.
#[inline]
pub fn algebraic_to_field(square: &str) -> Result<Field, String> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid algebraic square: {square}"));
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("Invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("Invalid algebraic rank: {}", rank as char));
    }

    Field::from_file_rank(file - b'a', rank - b'1')
        .ok_or_else(|| format!("Invalid algebraic square: {square}"))
}

/// Convert a one-hot bitboard to algebraic notation (for example: "e4").
#[inline]
pub fn bitboard_to_algebraic(bitboard: BitBoard) -> Result<String, String> {
    if bitboard.count_ones() != 1 {
        return Err(format!(
            "Bitboard must contain exactly one set bit, got {}",
            bitboard.count_ones()
        ));
    }

    Field::first_of(bitboard)
        .map(|field| field.to_string())
        .ok_or_else(|| "Bitboard must not be empty".to_owned())
}
