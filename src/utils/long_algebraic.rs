//! Long algebraic move text ("e2e4", "e7e8n") for the turns of a [`GameState`].

use crate::chess_errors::{ChessEngineError, ChessEngineResult};
use crate::game_state::chess_types::PieceType;
use crate::game_state::game_state::GameState;
use crate::game_state::turn::Turn;
use crate::utils::algebraic::algebraic_to_field;

fn promotion_from_char(ch: char) -> Option<PieceType> {
    match ch.to_ascii_lowercase() {
        'q' => Some(PieceType::Queen),
        'r' => Some(PieceType::Rook),
        'b' => Some(PieceType::Bishop),
        'n' => Some(PieceType::Knight),
        _ => None,
    }
}

/// Resolve `long_algebraic` against the legal turns of `game_state`.
///
/// Castling is written as the king's two-square move (`e1g1`). A missing
/// promotion suffix selects the queen.
pub fn long_algebraic_to_turn(
    long_algebraic: &str,
    game_state: &GameState,
) -> ChessEngineResult<Turn> {
    let invalid = |reason: String| ChessEngineError::InvalidMoveText {
        text: long_algebraic.to_owned(),
        reason,
    };

    if !long_algebraic.is_ascii() || !(4..=5).contains(&long_algebraic.len()) {
        return Err(invalid("expected four or five characters".to_owned()));
    }

    let from = algebraic_to_field(&long_algebraic[0..2]).map_err(invalid)?;
    let to = algebraic_to_field(&long_algebraic[2..4]).map_err(invalid)?;
    let promotion = match long_algebraic[4..].chars().next() {
        Some(ch) => {
            let piece = promotion_from_char(ch)
                .ok_or_else(|| invalid(format!("unknown promotion piece '{ch}'")))?;
            Some(piece)
        }
        None => None,
    };

    game_state
        .find_turn(from, to, promotion)
        .ok_or_else(|| ChessEngineError::IllegalTurn {
            text: long_algebraic.to_owned(),
            player: format!("{:?}", game_state.next_player()),
        })
}

/// Apply a sequence of whitespace-separated long algebraic moves.
pub fn apply_long_algebraic_line(
    game_state: &mut GameState,
    line: &str,
) -> ChessEngineResult<Vec<Turn>> {
    let mut played = Vec::new();
    for token in line.split_whitespace() {
        let turn = long_algebraic_to_turn(token, game_state)?;
        game_state.apply_turn(&turn);
        played.push(turn);
    }
    Ok(played)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::turn::TurnAction;

    #[test]
    fn parses_plain_castling_and_promotion_moves() {
        let mut state = GameState::new_game();
        let played = apply_long_algebraic_line(&mut state, "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 e1g1")
            .expect("opening line is legal");
        assert_eq!(played.len(), 7);
        assert_eq!(played[6].action, TurnAction::Castle);
        assert_eq!(
            state.to_fen(),
            "r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4"
        );

        let promo = GameState::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").expect("FEN");
        let turn = long_algebraic_to_turn("a7a8n", &promo).expect("under-promotion");
        assert_eq!(turn.action, TurnAction::PromotionKnight);
        let turn = long_algebraic_to_turn("a7a8", &promo).expect("default promotion");
        assert_eq!(turn.action, TurnAction::PromotionQueen);
    }

    #[test]
    fn rejects_malformed_and_illegal_text() {
        let state = GameState::new_game();
        assert!(matches!(
            long_algebraic_to_turn("e2", &state),
            Err(ChessEngineError::InvalidMoveText { .. })
        ));
        assert!(matches!(
            long_algebraic_to_turn("e2e4x", &state),
            Err(ChessEngineError::InvalidMoveText { .. })
        ));
        assert!(matches!(
            long_algebraic_to_turn("e2e5", &state),
            Err(ChessEngineError::IllegalTurn { .. })
        ));
    }
}
