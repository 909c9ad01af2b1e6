//! FEN-to-ChessBoard parser.
//!
//! Parsing is deliberately lenient: short ranks are padded with empty squares,
//! squares past the h-file are ignored and missing trailing fields take their
//! usual defaults. Only tokens that cannot be interpreted at all are errors.

use thiserror::Error;

use crate::game_state::chess_board::ChessBoard;
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_field;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("missing board layout in FEN")]
    MissingBoard,
    #[error("invalid piece character '{0}' in board layout")]
    InvalidPiece(char),
    #[error("invalid side-to-move field: {0}")]
    InvalidSide(String),
    #[error("invalid en-passant square: {0}")]
    InvalidEnPassant(String),
    #[error("invalid move clock: {0}")]
    InvalidClock(String),
}

pub fn parse_fen(fen: &str) -> Result<ChessBoard, FenError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(FenError::MissingBoard)?;
    let side_part = parts.next().unwrap_or("w");
    let castling_part = parts.next().unwrap_or("-");
    let en_passant_part = parts.next().unwrap_or("-");
    let half_move_part = parts.next().unwrap_or("0");
    let full_move_part = parts.next().unwrap_or("1");

    let pieces = parse_board(board_part)?;
    let next_player = parse_side_to_move(side_part)?;
    let castling_rights = parse_castling_rights(castling_part);
    let en_passant = parse_en_passant_field(en_passant_part)?;
    let half_move_clock = parse_clock(half_move_part)?;
    let full_move_clock = parse_clock(full_move_part)?;

    Ok(ChessBoard::from_pieces(
        &pieces,
        next_player,
        castling_rights,
        en_passant,
        half_move_clock,
        full_move_clock,
    ))
}

fn parse_board(board_part: &str) -> Result<[Option<Piece>; 64], FenError> {
    let mut pieces = [None; 64];

    for (fen_rank_idx, rank_str) in board_part.split('/').take(8).enumerate() {
        let rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                file = file.saturating_add(empty_count as u8);
                continue;
            }

            let piece = Piece::from_fen_char(ch).ok_or(FenError::InvalidPiece(ch))?;
            if let Some(field) = Field::from_file_rank(file, rank) {
                pieces[field.index()] = Some(piece);
            }
            file = file.saturating_add(1);
        }
    }

    Ok(pieces)
}

fn parse_side_to_move(side_part: &str) -> Result<PlayerColor, FenError> {
    match side_part {
        "w" | "W" => Ok(PlayerColor::White),
        "b" | "B" => Ok(PlayerColor::Black),
        _ => Err(FenError::InvalidSide(side_part.to_owned())),
    }
}

/// Unknown castling characters are ignored.
fn parse_castling_rights(castling_part: &str) -> CastlingRights {
    castling_part.chars().fold(0, |rights, ch| match ch {
        'K' => rights | CASTLE_WHITE_SHORT,
        'Q' => rights | CASTLE_WHITE_LONG,
        'k' => rights | CASTLE_BLACK_SHORT,
        'q' => rights | CASTLE_BLACK_LONG,
        _ => rights,
    })
}

fn parse_en_passant_field(en_passant_part: &str) -> Result<Option<Field>, FenError> {
    if en_passant_part == "-" {
        return Ok(None);
    }
    algebraic_to_field(en_passant_part)
        .map(Some)
        .map_err(|_| FenError::InvalidEnPassant(en_passant_part.to_owned()))
}

fn parse_clock(clock_part: &str) -> Result<u32, FenError> {
    clock_part
        .parse::<u32>()
        .map_err(|_| FenError::InvalidClock(clock_part.to_owned()))
}
