//! Terminal-oriented Unicode board renderer.
//!
//! Creates a human-readable board view for debugging, tests and diagnostics
//! in text environments.

use crate::game_state::chess_types::*;
use crate::game_state::game_state::GameState;

/// Render the board, side to move and FEN to a Unicode string.
pub fn render_game_state(game_state: &GameState) -> String {
    let board = game_state.board();
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            let piece = Field::from_file_rank(file, rank).and_then(|field| board.piece_at(field));
            out.push(piece.map_or('·', piece_to_unicode));

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h\n");
    out.push_str(&format!("{:?} to move", game_state.next_player()));
    if game_state.is_game_over() {
        match game_state.winner() {
            Some(winner) => out.push_str(&format!(", {winner:?} wins")),
            None => out.push_str(", draw"),
        }
    }
    out.push('\n');
    out.push_str(&game_state.to_fen());

    out
}

fn piece_to_unicode(piece: Piece) -> char {
    match (piece.player, piece.piece_type) {
        (PlayerColor::White, PieceType::Pawn) => '♙',
        (PlayerColor::White, PieceType::Knight) => '♘',
        (PlayerColor::White, PieceType::Bishop) => '♗',
        (PlayerColor::White, PieceType::Rook) => '♖',
        (PlayerColor::White, PieceType::Queen) => '♕',
        (PlayerColor::White, PieceType::King) => '♔',
        (PlayerColor::Black, PieceType::Pawn) => '♟',
        (PlayerColor::Black, PieceType::Knight) => '♞',
        (PlayerColor::Black, PieceType::Bishop) => '♝',
        (PlayerColor::Black, PieceType::Rook) => '♜',
        (PlayerColor::Black, PieceType::Queen) => '♛',
        (PlayerColor::Black, PieceType::King) => '♚',
    }
}
