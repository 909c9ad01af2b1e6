//! Legal turn generation plus check, checkmate and stalemate detection.
//!
//! Generation works on the board's bitboards directly:
//! 1. opponent attack set, computed with the mover's king removed so sliders
//!    see through it;
//! 2. check detection and the "uncheck" mask (capture the checker or block
//!    its ray);
//! 3. castling and per-piece destinations;
//! 4. re-validation of candidates that could uncover a check, done by
//!    speculatively editing the bitboards and restoring them on drop.

use crate::game_state::chess_board::{ChessBoard, ALL_PIECES};
use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::game_state::turn::{Turn, TurnAction};
use crate::move_generation::bit_boards::*;

/// Every square `attacker` attacks. Pieces in `transparent` do not block
/// sliding rays. A slider's first blocker (of either colour) is attacked.
pub fn attacked_fields(
    bit_boards: &[[BitBoard; 7]; 2],
    attacker: PlayerColor,
    transparent: BitBoard,
) -> BitBoard {
    let occupied = (bit_boards[0][ALL_PIECES] | bit_boards[1][ALL_PIECES]) & !transparent;
    let empty = !occupied;
    let own = &bit_boards[attacker.index()];
    let diagonal = own[PieceType::Bishop.index()] | own[PieceType::Queen.index()];
    let orthogonal = own[PieceType::Rook.index()] | own[PieceType::Queen.index()];

    pawn_attacks(own[PieceType::Pawn.index()], attacker)
        | knight_attacks(own[PieceType::Knight.index()])
        | king_attacks(own[PieceType::King.index()])
        | bishop_attacks(diagonal, empty)
        | rook_attacks(orthogonal, empty)
}

/// Pieces of `attacker` giving check to the king on `king`.
fn checkers(bit_boards: &[[BitBoard; 7]; 2], king: Field, attacker: PlayerColor) -> BitBoard {
    let empty = !(bit_boards[0][ALL_PIECES] | bit_boards[1][ALL_PIECES]);
    let own = &bit_boards[attacker.index()];
    let king_bit = king.bit();
    let diagonal = own[PieceType::Bishop.index()] | own[PieceType::Queen.index()];
    let orthogonal = own[PieceType::Rook.index()] | own[PieceType::Queen.index()];

    (pawn_attacks(king_bit, attacker.opponent()) & own[PieceType::Pawn.index()])
        | (knight_attacks(king_bit) & own[PieceType::Knight.index()])
        | (king_attacks(king_bit) & own[PieceType::King.index()])
        | (bishop_attacks(king_bit, empty) & diagonal)
        | (rook_attacks(king_bit, empty) & orthogonal)
}

/// Destinations that resolve a single check: the checker's field and the ray
/// between a sliding checker and the king. Double check leaves only king
/// moves, so the mask is empty.
fn uncheck_fields(board: &ChessBoard, king: Field, checkers: BitBoard) -> BitBoard {
    if checkers.count_ones() != 1 {
        return EMPTY;
    }
    let Some(checker) = Field::first_of(checkers) else {
        return EMPTY;
    };
    let mut fields = checkers | between(checker, king);

    // A double-pushed pawn giving check can also be taken en passant.
    if let Some(target) = board.en_passant {
        let pushed_pawn = pawn_push(target.bit(), board.next_player.opponent());
        if pushed_pawn == checkers {
            fields |= target.bit();
        }
    }
    fields
}

/// Restores the board's bitboards when dropped, however the scope is left.
struct SpeculativeTurn<'a> {
    board: &'a mut ChessBoard,
    saved: [[BitBoard; 7]; 2],
}

impl<'a> SpeculativeTurn<'a> {
    fn new(board: &'a mut ChessBoard) -> Self {
        let saved = board.bit_boards;
        Self { board, saved }
    }

    fn apply(&mut self, piece: Piece, from: Field, to: Field, captured: Field) {
        let opponent = piece.player.opponent();
        for bits in &mut self.board.bit_boards[opponent.index()][..ALL_PIECES] {
            *bits &= !captured.bit();
        }
        let bits = &mut self.board.bit_boards[piece.player.index()][piece.piece_type.index()];
        *bits = (*bits & !from.bit()) | to.bit();
        self.board.update_all_pieces();
    }

    fn king_attacked(&self, player: PlayerColor) -> bool {
        let bit_boards = &self.board.bit_boards;
        let king = bit_boards[player.index()][PieceType::King.index()];
        attacked_fields(bit_boards, player.opponent(), EMPTY) & king != 0
    }
}

impl Drop for SpeculativeTurn<'_> {
    fn drop(&mut self) {
        self.board.bit_boards = self.saved;
    }
}

/// True when playing `piece` from `from` to `to` leaves its own king attacked.
fn exposes_king(
    board: &mut ChessBoard,
    piece: Piece,
    from: Field,
    to: Field,
    captured: Field,
) -> bool {
    let mut speculative = SpeculativeTurn::new(board);
    speculative.apply(piece, from, to, captured);
    speculative.king_attacked(piece.player)
}

#[derive(Debug, Clone, Default)]
pub struct TurnGenerator {
    turn_list: Vec<Turn>,
}

impl TurnGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legal turns from the last call to [`TurnGenerator::generate`].
    #[inline]
    pub fn turn_list(&self) -> &[Turn] {
        &self.turn_list
    }

    /// Regenerate the legal turns for the side to move and update the board's
    /// check, checkmate and stalemate flags.
    pub fn generate(&mut self, board: &mut ChessBoard) -> &[Turn] {
        self.turn_list.clear();
        board.king_in_check = [false; 2];
        board.checkmate = [false; 2];
        board.stalemate = false;

        let mover = board.next_player;
        let opponent = mover.opponent();

        // A king left en prise means the previous side already lost.
        let opponent_king = board.bit_boards[opponent.index()][PieceType::King.index()];
        if opponent_king != 0
            && attacked_fields(&board.bit_boards, mover, EMPTY) & opponent_king != 0
        {
            board.king_in_check[opponent.index()] = true;
            board.checkmate[opponent.index()] = true;
            return &self.turn_list;
        }

        let king_bits = board.bit_boards[mover.index()][PieceType::King.index()];
        let opponent_attacks = attacked_fields(&board.bit_boards, opponent, king_bits);
        let in_check = king_bits & opponent_attacks != 0;

        let target_mask = match Field::first_of(king_bits) {
            Some(king) if in_check => {
                let checking = checkers(&board.bit_boards, king, opponent);
                uncheck_fields(board, king, checking)
            }
            _ => FULL,
        };

        if let Some(king) = Field::first_of(king_bits) {
            self.king_turns(board, king, opponent_attacks);
            if !in_check {
                self.castling_turns(board, king, opponent_attacks);
            }
        }
        self.piece_turns(board, opponent_attacks, target_mask);

        if self.turn_list.is_empty() {
            if in_check {
                board.checkmate[mover.index()] = true;
            } else {
                board.stalemate = true;
            }
        }
        board.king_in_check[mover.index()] = in_check;

        &self.turn_list
    }

    fn king_turns(&mut self, board: &ChessBoard, king: Field, opponent_attacks: BitBoard) {
        let mover = board.next_player;
        let piece = Piece::new(mover, PieceType::King);
        let targets = king_attacks(king.bit()) & !board.occupied_by(mover) & !opponent_attacks;
        for to in fields_of(targets) {
            self.turn_list.push(Turn::move_to(piece, king, to));
        }
    }

    fn castling_turns(&mut self, board: &ChessBoard, king: Field, opponent_attacks: BitBoard) {
        let mover = board.next_player;
        if king != king_home(mover) {
            return;
        }
        let rooks = board.pieces_of(Piece::new(mover, PieceType::Rook));
        let occupied = board.occupied();
        let piece = Piece::new(mover, PieceType::King);

        for (right, rook_home) in [
            (castle_short_right(mover), short_rook_home(mover)),
            (castle_long_right(mover), long_rook_home(mover)),
        ] {
            if board.castling_rights & right == 0 || rooks & rook_home.bit() == 0 {
                continue;
            }
            if between(king, rook_home) & occupied != 0 {
                continue;
            }
            // King passes over the square next to it and lands two files away.
            let destination = if rook_home.file() > king.file() {
                Field::from_file_rank(king.file() + 2, king.rank())
            } else {
                Field::from_file_rank(king.file() - 2, king.rank())
            };
            let Some(destination) = destination else {
                continue;
            };
            if between(king, destination) & opponent_attacks != 0
                || destination.bit() & opponent_attacks != 0
            {
                continue;
            }
            self.turn_list.push(Turn::castle(piece, king, destination));
        }
    }

    fn piece_turns(
        &mut self,
        board: &mut ChessBoard,
        opponent_attacks: BitBoard,
        target_mask: BitBoard,
    ) {
        let mover = board.next_player;
        let own = board.occupied_by(mover);
        let enemy = board.occupied_by(mover.opponent());
        let empty = !(own | enemy);

        for piece_type in [
            PieceType::Queen,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ] {
            let piece = Piece::new(mover, piece_type);
            for from in fields_of(board.pieces_of(piece)) {
                let reach = match piece_type {
                    PieceType::Queen => queen_attacks(from.bit(), empty),
                    PieceType::Bishop => bishop_attacks(from.bit(), empty),
                    PieceType::Rook => rook_attacks(from.bit(), empty),
                    _ => knight_attacks(from.bit()),
                };
                let validate = from.bit() & opponent_attacks != 0;
                for to in fields_of(reach & !own & target_mask) {
                    if validate && exposes_king(board, piece, from, to, to) {
                        continue;
                    }
                    self.turn_list.push(Turn::move_to(piece, from, to));
                }
            }
        }

        self.pawn_turns(board, opponent_attacks, target_mask, empty, enemy);
    }

    fn pawn_turns(
        &mut self,
        board: &mut ChessBoard,
        opponent_attacks: BitBoard,
        target_mask: BitBoard,
        empty: BitBoard,
        enemy: BitBoard,
    ) {
        let mover = board.next_player;
        let piece = Piece::new(mover, PieceType::Pawn);
        let start_rank = mask_rank(pawn_start_rank(mover));
        let en_passant = board.en_passant;

        for from in fields_of(board.pieces_of(piece)) {
            let single = pawn_push(from.bit(), mover) & empty;
            let double = pawn_push(single & pawn_push(start_rank, mover), mover) & empty;
            let diagonals = pawn_attacks(from.bit(), mover);
            let validate = from.bit() & opponent_attacks != 0;

            let targets = (single | double | (diagonals & enemy)) & target_mask;
            for to in fields_of(targets) {
                if validate && exposes_king(board, piece, from, to, to) {
                    continue;
                }
                self.push_pawn_turn(piece, from, to);
            }

            if let Some(target) = en_passant {
                if diagonals & target.bit() & target_mask == 0 {
                    continue;
                }
                let Some(captured) = Field::from_file_rank(target.file(), from.rank()) else {
                    continue;
                };
                // Two pawns leave one rank at once: always re-validate.
                if !exposes_king(board, piece, from, target, captured) {
                    self.turn_list.push(Turn::move_to(piece, from, target));
                }
            }
        }
    }

    fn push_pawn_turn(&mut self, pawn: Piece, from: Field, to: Field) {
        if to.rank() == promotion_rank(pawn.player) {
            for action in TurnAction::PROMOTIONS {
                self.turn_list.push(Turn::promotion(pawn, from, to, action));
            }
        } else {
            self.turn_list.push(Turn::move_to(pawn, from, to));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(fen: &str) -> (ChessBoard, Vec<Turn>) {
        let mut board = ChessBoard::from_fen(fen).expect("FEN should parse");
        let mut generator = TurnGenerator::new();
        let turns = generator.generate(&mut board).to_vec();
        (board, turns)
    }

    fn has(turns: &[Turn], from: Field, to: Field) -> bool {
        turns.iter().any(|t| t.from == from && t.to == to)
    }

    fn turns_of(turns: &[Turn], piece_type: PieceType) -> Vec<Turn> {
        turns
            .iter()
            .copied()
            .filter(|t| t.piece.piece_type == piece_type)
            .collect()
    }

    fn castle_targets(turns: &[Turn]) -> Vec<Field> {
        turns
            .iter()
            .filter(|t| t.action == TurnAction::Castle)
            .map(|t| t.to)
            .collect()
    }

    #[test]
    fn starting_position_has_twenty_turns() {
        let (board, turns) = generate(STARTING_POSITION_FEN);
        assert_eq!(turns.len(), 20);
        assert!(!board.is_king_in_check(PlayerColor::White));
    }

    #[test]
    fn pinned_piece_stays_on_its_ray() {
        // Knight on e2 is pinned by the rook on e8.
        let (_, turns) = generate("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(turns_of(&turns, PieceType::Knight).is_empty());

        // Rook on d1 is pinned along the first rank.
        let (_, turns) = generate("7k/8/8/8/8/8/8/r2RK3 w - - 0 1");
        let rook_turns = turns_of(&turns, PieceType::Rook);
        assert!(rook_turns.iter().all(|t| t.to.rank() == 0));
        assert!(has(&turns, Field::D1, Field::A1));
    }

    #[test]
    fn check_restricts_to_capture_block_or_king_move() {
        let (board, turns) = generate("4k3/8/8/8/8/8/3q4/R3K2R w KQ - 0 1");
        assert!(board.is_king_in_check(PlayerColor::White));
        assert!(turns.iter().all(|t| t.action != TurnAction::Castle));
        // Only the king can act: it may capture the undefended queen.
        assert!(turns.iter().all(|t| t.piece.piece_type == PieceType::King));
        assert!(has(&turns, Field::E1, Field::D2));
        assert!(!has(&turns, Field::E1, Field::D1));
    }

    #[test]
    fn king_cannot_step_back_along_checking_ray() {
        let (_, turns) = generate("4k3/8/8/8/4r3/8/4K3/8 w - - 0 1");
        assert!(!has(&turns, Field::E2, Field::E1));
        assert!(has(&turns, Field::E2, Field::D1));
    }

    #[test]
    fn castling_requires_safe_path() {
        let (_, turns) = generate("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(castle_targets(&turns), vec![Field::G1, Field::C1]);

        // Bishop on a6 covers f1: short castling is off, long still fine.
        let (_, turns) = generate("r3k2r/8/b7/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(castle_targets(&turns), vec![Field::C1]);

        // b1 attacked does not matter for long castling, b1 occupied does.
        let (_, turns) = generate("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert_eq!(castle_targets(&turns), vec![Field::G1]);
    }

    #[test]
    fn promotion_expands_to_four_turns() {
        let (_, turns) = generate("7k/P7/8/8/8/8/8/K7 w - - 0 1");
        let promotions: Vec<_> = turns.iter().filter(|t| t.is_promotion()).collect();
        assert_eq!(promotions.len(), 4);
        assert_eq!(promotions[0].action, TurnAction::PromotionQueen);
        assert_eq!(promotions[3].action, TurnAction::PromotionRook);
    }

    #[test]
    fn en_passant_after_double_push() {
        let mut board = ChessBoard::from_fen("k7/8/8/8/4p3/8/3P4/7K w - - 0 1").expect("FEN");
        let pawn = Piece::new(PlayerColor::White, PieceType::Pawn);
        board.apply_turn(&Turn::move_to(pawn, Field::D2, Field::D4));
        let mut generator = TurnGenerator::new();
        let turns = generator.generate(&mut board);
        assert!(has(turns, Field::E4, Field::D3));
        assert!(has(turns, Field::E4, Field::E3));
    }

    #[test]
    fn en_passant_discovering_rank_check_is_rejected() {
        let (_, turns) = generate("8/8/8/K2Pp2r/8/8/8/7k w - e6 0 1");
        assert!(!has(&turns, Field::D5, Field::E6));
        assert!(has(&turns, Field::D5, Field::D6));
    }

    #[test]
    fn en_passant_resolves_pawn_check() {
        let (board, turns) = generate("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        assert!(board.is_king_in_check(PlayerColor::Black));
        assert!(has(&turns, Field::E4, Field::D3));
    }

    #[test]
    fn checkmate_and_stalemate_flags() {
        let (board, turns) = generate("8/8/8/8/8/1Q5K/p7/k7 b - - 0 39");
        assert!(turns.is_empty());
        assert!(board.is_stalemate());
        assert!(!board.is_checkmate(PlayerColor::Black));

        let (board, turns) = generate("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        assert!(turns.is_empty());
        assert!(board.is_checkmate(PlayerColor::Black));
        assert!(board.is_king_in_check(PlayerColor::Black));
    }

    #[test]
    fn capturable_king_ends_the_game() {
        let (board, turns) = generate("2br4/1pp2p1k/4p2P/4r2K/8/4q3/8/8 b - - 0 40");
        assert!(turns.is_empty());
        assert!(board.is_king_in_check(PlayerColor::White));
        assert!(board.is_checkmate(PlayerColor::White));
        assert!(!board.is_king_in_check(PlayerColor::Black));
        assert!(!board.is_checkmate(PlayerColor::Black));
    }

    #[test]
    fn speculative_validation_leaves_board_untouched() {
        let mut board = ChessBoard::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").expect("FEN");
        let before = board.clone();
        TurnGenerator::new().generate(&mut board);
        assert_eq!(board.bit_boards(), before.bit_boards());
    }
}
