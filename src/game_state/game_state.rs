//! Game facade pairing a board with its current legal turn list.
//!
//! This is the surface the rest of an application talks to: apply a turn,
//! list legal turns, read score/hash/winner, and convert to or from FEN.

use tracing::{info, trace};

use crate::game_state::chess_board::ChessBoard;
use crate::game_state::chess_types::*;
use crate::game_state::turn::{Turn, TurnAction};
use crate::move_generation::turn_generator::TurnGenerator;
use crate::utils::fen_parser::FenError;

/// Score of a decided game from the winner's point of view.
pub const WIN_SCORE: Score = 100_000;

#[derive(Debug, Clone)]
pub struct GameState {
    board: ChessBoard,
    turn_generator: TurnGenerator,
    forfeited: Option<PlayerColor>,
}

impl GameState {
    /// Standard starting position.
    pub fn new_game() -> Self {
        Self::from_board(ChessBoard::standard())
    }

    pub fn from_board(board: ChessBoard) -> Self {
        let mut state = Self {
            board,
            turn_generator: TurnGenerator::new(),
            forfeited: None,
        };
        state.turn_generator.generate(&mut state.board);
        state
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_board(ChessBoard::from_fen(fen)?))
    }

    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    #[inline]
    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    #[inline]
    pub fn turn_list(&self) -> &[Turn] {
        self.turn_generator.turn_list()
    }

    /// Apply a turn taken from [`GameState::turn_list`] (or a pass/forfeit)
    /// and regenerate the legal turns for the new side to move.
    pub fn apply_turn(&mut self, turn: &Turn) {
        trace!(
            target: "chess3d_engine::game",
            %turn,
            player = ?self.next_player(),
            "apply turn"
        );
        self.advance(turn);
        if self.is_game_over() {
            info!(
                target: "chess3d_engine::game",
                winner = ?self.winner(),
                "game over"
            );
        }
    }

    /// [`GameState::apply_turn`] without logging, for search trees.
    pub(crate) fn advance(&mut self, turn: &Turn) {
        if turn.action == TurnAction::Forfeit {
            self.forfeited = Some(self.board.next_player());
        } else {
            self.board.apply_turn(turn);
            self.turn_generator.generate(&mut self.board);
        }
    }

    #[inline]
    pub fn next_player(&self) -> PlayerColor {
        self.board.next_player()
    }

    pub fn is_game_over(&self) -> bool {
        self.forfeited.is_some()
            || self.board.is_checkmate(PlayerColor::White)
            || self.board.is_checkmate(PlayerColor::Black)
            || self.board.is_stalemate()
    }

    /// `None` while the game runs and for a draw.
    pub fn winner(&self) -> Option<PlayerColor> {
        if let Some(player) = self.forfeited {
            return Some(player.opponent());
        }
        [PlayerColor::White, PlayerColor::Black]
            .into_iter()
            .find(|player| self.board.is_checkmate(*player))
            .map(PlayerColor::opponent)
    }

    /// Score for the side to move. Decided games score `±WIN_SCORE`, draws 0.
    pub fn score(&self) -> Score {
        let player = self.next_player();
        if !self.is_game_over() {
            return self.board.score(player);
        }
        match self.winner() {
            Some(winner) if winner == player => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0,
        }
    }

    #[inline]
    pub fn hash(&self) -> Hash {
        self.board.hash()
    }

    /// Legal turn moving from `from` to `to`; `promotion` picks among the
    /// four promotion turns and defaults to a queen.
    pub fn find_turn(&self, from: Field, to: Field, promotion: Option<PieceType>) -> Option<Turn> {
        let wanted = promotion.unwrap_or(PieceType::Queen);
        self.turn_list().iter().copied().find(|turn| {
            turn.from == from
                && turn.to == to
                && turn
                    .action
                    .promotion_piece()
                    .map_or(true, |piece_type| piece_type == wanted)
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_game()
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.forfeited == other.forfeited
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::search::board_scoring::IncrementalMaterialAndPstEvaluator;
    use crate::search::zobrist::hash_full_board;

    #[test]
    fn new_game_starts_with_white() {
        let state = GameState::new_game();
        assert_eq!(state.next_player(), PlayerColor::White);
        assert_eq!(state.turn_list().len(), 20);
        assert_eq!(state.to_fen(), STARTING_POSITION_FEN);
        assert!(!state.is_game_over());
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn pass_turns_flip_next_player() {
        let mut state = GameState::new_game();
        state.apply_turn(&Turn::pass(PlayerColor::White));
        assert_eq!(state.next_player(), PlayerColor::Black);
        assert_eq!(state.turn_list().len(), 20);
        state.apply_turn(&Turn::pass(PlayerColor::Black));
        assert_eq!(state.next_player(), PlayerColor::White);
    }

    #[test]
    fn forfeit_hands_the_win_to_the_opponent() {
        let mut state = GameState::new_game();
        state.apply_turn(&Turn::forfeit(PlayerColor::White));
        assert!(state.is_game_over());
        assert_eq!(state.winner(), Some(PlayerColor::Black));
        assert_eq!(state.score(), -WIN_SCORE);
    }

    #[test]
    fn checkmate_scenario_from_bug_report() {
        for fen in [
            "2br4/1pp2p1k/4p2P/4r2K/8/4q3/8/8 b - - 0 40",
            "2br4/1pp2p1k/4p2P/3r2K/8/4q3/8/8 b - - 0 39",
        ] {
            let state = GameState::from_fen(fen).expect("FEN should parse");
            assert!(state.turn_list().is_empty(), "{fen}");
            assert!(state.board().is_king_in_check(PlayerColor::White));
            assert!(state.board().is_checkmate(PlayerColor::White));
            assert!(!state.board().is_king_in_check(PlayerColor::Black));
            assert!(!state.board().is_checkmate(PlayerColor::Black));
            assert!(state.is_game_over());
            assert_eq!(state.winner(), Some(PlayerColor::Black));
        }
    }

    #[test]
    fn stalemate_is_a_draw() {
        let state = GameState::from_fen("8/8/8/8/8/1Q5K/p7/k7 b - - 0 39").expect("FEN");
        assert!(state.turn_list().is_empty());
        assert!(state.is_game_over());
        assert_eq!(state.winner(), None);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn find_turn_selects_promotion_piece() {
        let state = GameState::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").expect("FEN");
        let queen = state
            .find_turn(Field::A7, Field::A8, None)
            .expect("promotion");
        assert_eq!(queen.action, TurnAction::PromotionQueen);
        let knight = state
            .find_turn(Field::A7, Field::A8, Some(PieceType::Knight))
            .expect("under-promotion");
        assert_eq!(knight.action, TurnAction::PromotionKnight);
        assert_eq!(state.find_turn(Field::A7, Field::B8, None), None);
    }

    #[test]
    fn random_play_keeps_incremental_state_consistent() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _game in 0..20 {
            let mut state = GameState::new_game();
            for _ply in 0..120 {
                if state.is_game_over() {
                    break;
                }
                let turns = state.turn_list();
                let turn = turns[rng.random_range(0..turns.len())];
                state.apply_turn(&turn);

                let board = state.board();
                assert_eq!(board.hash(), hash_full_board(board));
                assert_eq!(
                    board.score(PlayerColor::White),
                    IncrementalMaterialAndPstEvaluator::estimate_full_board(&board.board())
                );
                let reparsed = ChessBoard::from_fen(&board.to_fen()).expect("round trip");
                assert_eq!(&reparsed, board);
            }
        }
    }
}
