//! Crate-wide error type.
//!
//! Each fallible subsystem keeps its own narrow error ([`FenError`],
//! [`BookError`]); `ChessEngineError` wraps them for callers that want a
//! single type to propagate with `?`.

use thiserror::Error;

use crate::engines::ai_player::AiPlayerState;
use crate::tables::opening_book::BookError;
use crate::utils::fen_parser::FenError;

#[derive(Error, Debug)]
pub enum ChessEngineError {
    #[error("invalid FEN: {0}")]
    Fen(#[from] FenError),

    #[error("opening book error: {0}")]
    Book(#[from] BookError),

    /// A square or move string that could not be read.
    #[error("invalid move text '{text}': {reason}")]
    InvalidMoveText { text: String, reason: String },

    /// Well-formed move that is not in the current turn list.
    #[error("illegal turn {text} for {player}")]
    IllegalTurn { text: String, player: String },

    /// The AI player cannot take a turn request in this state.
    #[error("AI player is {state}")]
    InvalidPlayerState { state: AiPlayerState },
}

pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
