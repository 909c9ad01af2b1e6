use crate::game_state::chess_board::ChessBoard;
use crate::game_state::chess_types::*;

pub fn generate_fen(board: &ChessBoard) -> String {
    let placement = generate_board_field(&board.board());
    let side_to_move = match board.next_player() {
        PlayerColor::White => "w",
        PlayerColor::Black => "b",
    };
    let castling = generate_castling_field(board.castling_rights());
    let en_passant = board
        .en_passant()
        .map_or_else(|| "-".to_owned(), |field| field.to_string());

    format!(
        "{} {} {} {} {} {}",
        placement,
        side_to_move,
        castling,
        en_passant,
        board.half_move_clock(),
        board.full_move_clock()
    )
}

fn generate_board_field(pieces: &[Option<Piece>; 64]) -> String {
    let mut out = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8 {
            if let Some(piece) = pieces[rank * 8 + file] {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(piece.fen_char());
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(castling_rights: CastlingRights) -> String {
    let mut out = String::new();
    for (right, ch) in [
        (CASTLE_WHITE_SHORT, 'K'),
        (CASTLE_WHITE_LONG, 'Q'),
        (CASTLE_BLACK_SHORT, 'k'),
        (CASTLE_BLACK_LONG, 'q'),
    ] {
        if castling_rights & right != 0 {
            out.push(ch);
        }
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}
