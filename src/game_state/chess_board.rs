//! Bitboard position state with incremental evaluation and hashing.
//!
//! `ChessBoard` is the authoritative, mutable position. Every mutation done by
//! [`ChessBoard::apply_turn`] is mirrored into the owned evaluator and hasher
//! so score and hash reads stay O(1) and always equal a from-scratch
//! recomputation. Check/mate/stalemate flags are written by the turn
//! generator, not derived here.

use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::game_state::turn::{Turn, TurnAction};
use crate::search::board_scoring::IncrementalMaterialAndPstEvaluator;
use crate::search::zobrist::{hashable_en_passant_file, IncrementalZobristHasher};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::{parse_fen, FenError};

/// Index of the per-colour union bitboard in `bit_boards[color]`.
pub const ALL_PIECES: usize = 6;

#[derive(Debug, Clone)]
pub struct ChessBoard {
    pub(crate) bit_boards: [[BitBoard; 7]; 2],
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant: Option<Field>,
    pub(crate) half_move_clock: u32,
    pub(crate) full_move_clock: u32,
    pub(crate) next_player: PlayerColor,
    pub(crate) captured_pieces: Vec<Piece>,
    pub(crate) evaluator: IncrementalMaterialAndPstEvaluator,
    pub(crate) hasher: IncrementalZobristHasher,
    pub(crate) king_in_check: [bool; 2],
    pub(crate) checkmate: [bool; 2],
    pub(crate) stalemate: bool,
}

/// Castling rights lost when a piece leaves or lands on `field`.
const fn rights_touched_by(field: Field) -> CastlingRights {
    match field {
        Field::E1 => CASTLE_WHITE_SHORT | CASTLE_WHITE_LONG,
        Field::H1 => CASTLE_WHITE_SHORT,
        Field::A1 => CASTLE_WHITE_LONG,
        Field::E8 => CASTLE_BLACK_SHORT | CASTLE_BLACK_LONG,
        Field::H8 => CASTLE_BLACK_SHORT,
        Field::A8 => CASTLE_BLACK_LONG,
        _ => 0,
    }
}

impl ChessBoard {
    /// Standard initial position.
    pub fn standard() -> Self {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        let mut pieces = [None; 64];
        for (file, piece_type) in BACK_RANK.into_iter().enumerate() {
            pieces[file] = Some(Piece::new(PlayerColor::White, piece_type));
            pieces[8 + file] = Some(Piece::new(PlayerColor::White, PieceType::Pawn));
            pieces[48 + file] = Some(Piece::new(PlayerColor::Black, PieceType::Pawn));
            pieces[56 + file] = Some(Piece::new(PlayerColor::Black, piece_type));
        }
        Self::from_pieces(&pieces, PlayerColor::White, CASTLE_ALL, None, 0, 1)
    }

    /// Build a board from a dense piece array, seeding evaluator and hasher
    /// from scratch.
    pub fn from_pieces(
        pieces: &[Option<Piece>; 64],
        next_player: PlayerColor,
        castling_rights: CastlingRights,
        en_passant: Option<Field>,
        half_move_clock: u32,
        full_move_clock: u32,
    ) -> Self {
        let mut board = Self {
            bit_boards: [[0; 7]; 2],
            castling_rights: castling_rights & CASTLE_ALL,
            en_passant,
            half_move_clock,
            full_move_clock,
            next_player,
            captured_pieces: Vec::new(),
            evaluator: IncrementalMaterialAndPstEvaluator::from_board(pieces),
            hasher: IncrementalZobristHasher::default(),
            king_in_check: [false; 2],
            checkmate: [false; 2],
            stalemate: false,
        };

        for (piece, field) in pieces.iter().zip(Field::ALL) {
            if let Some(piece) = piece {
                board.bit_boards[piece.player.index()][piece.piece_type.index()] |= field.bit();
            }
        }
        board.update_all_pieces();
        board.hasher = IncrementalZobristHasher::from_board(&board);
        board
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        parse_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn bit_boards(&self) -> &[[BitBoard; 7]; 2] {
        &self.bit_boards
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece) -> BitBoard {
        self.bit_boards[piece.player.index()][piece.piece_type.index()]
    }

    #[inline]
    pub fn occupied_by(&self, player: PlayerColor) -> BitBoard {
        self.bit_boards[player.index()][ALL_PIECES]
    }

    #[inline]
    pub fn occupied(&self) -> BitBoard {
        self.occupied_by(PlayerColor::White) | self.occupied_by(PlayerColor::Black)
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Field> {
        self.en_passant
    }

    #[inline]
    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    #[inline]
    pub fn full_move_clock(&self) -> u32 {
        self.full_move_clock
    }

    #[inline]
    pub fn next_player(&self) -> PlayerColor {
        self.next_player
    }

    /// Pieces captured so far, in capture order.
    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured_pieces
    }

    #[inline]
    pub fn score(&self, player: PlayerColor) -> Score {
        self.evaluator.score(player)
    }

    #[inline]
    pub fn hash(&self) -> Hash {
        self.hasher.hash()
    }

    pub fn is_king_in_check(&self, player: PlayerColor) -> bool {
        self.king_in_check[player.index()]
    }

    pub fn is_checkmate(&self, player: PlayerColor) -> bool {
        self.checkmate[player.index()]
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    pub fn piece_at(&self, field: Field) -> Option<Piece> {
        let bit = field.bit();
        for player in [PlayerColor::White, PlayerColor::Black] {
            if self.bit_boards[player.index()][ALL_PIECES] & bit == 0 {
                continue;
            }
            for piece_type in PieceType::ALL {
                if self.bit_boards[player.index()][piece_type.index()] & bit != 0 {
                    return Some(Piece::new(player, piece_type));
                }
            }
        }
        None
    }

    /// Dense 64-entry view of the position (`a1` first).
    pub fn board(&self) -> [Option<Piece>; 64] {
        let mut out = [None; 64];
        for player in [PlayerColor::White, PlayerColor::Black] {
            for piece_type in PieceType::ALL {
                let piece = Piece::new(player, piece_type);
                for field in fields_of(self.bit_boards[player.index()][piece_type.index()]) {
                    out[field.index()] = Some(piece);
                }
            }
        }
        out
    }

    /// Apply `turn` for the side to move. The turn must come from this
    /// position's legal turn list.
    pub fn apply_turn(&mut self, turn: &Turn) {
        if turn.action == TurnAction::Forfeit {
            return;
        }

        let mover = self.next_player;
        debug_assert!(
            turn.action == TurnAction::Pass || turn.piece.player == mover,
            "turn {turn} applied for the wrong side"
        );

        if let Some(file) = self.hashable_en_passant_file() {
            self.hasher.en_passant_increment(file);
        }
        let previous_en_passant = self.en_passant.take();
        let mut reset_clock = false;

        match turn.action {
            TurnAction::Pass | TurnAction::Forfeit => {}
            TurnAction::Castle => {
                self.move_piece(turn.piece, turn.from, turn.to);
                match castling_rook_move(turn.to) {
                    Some((rook_from, rook_to)) => {
                        self.move_piece(Piece::new(mover, PieceType::Rook), rook_from, rook_to)
                    }
                    None => debug_assert!(false, "castle to {} has no rook move", turn.to),
                }
                reset_clock = true;
            }
            TurnAction::Move
            | TurnAction::PromotionQueen
            | TurnAction::PromotionBishop
            | TurnAction::PromotionKnight
            | TurnAction::PromotionRook => {
                debug_assert!(
                    self.pieces_of(turn.piece) & turn.from.bit() != 0,
                    "no {} on {}",
                    turn.piece,
                    turn.from
                );

                let is_pawn = turn.piece.piece_type == PieceType::Pawn;
                let capture_field = match previous_en_passant {
                    Some(target) if is_pawn && target == turn.to => {
                        Field::from_file_rank(target.file(), turn.from.rank())
                    }
                    _ => Some(turn.to),
                };
                if let Some(field) = capture_field {
                    if self.capture_at(field, mover.opponent()) {
                        reset_clock = true;
                    }
                }

                self.move_piece(turn.piece, turn.from, turn.to);

                if let Some(promoted) = turn.action.promotion_piece() {
                    self.promote(mover, turn.to, promoted);
                }

                if is_pawn {
                    reset_clock = true;
                    if turn.from.rank().abs_diff(turn.to.rank()) == 2 {
                        self.en_passant = Field::from_file_rank(
                            turn.from.file(),
                            (turn.from.rank() + turn.to.rank()) / 2,
                        );
                    }
                }
            }
        }

        if turn.action != TurnAction::Pass {
            let lost = self.castling_rights
                & (rights_touched_by(turn.from) | rights_touched_by(turn.to));
            if lost != 0 {
                self.castling_rights &= !lost;
                self.hasher.castling_increment(lost);
            }
        }

        self.update_all_pieces();

        if reset_clock {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }
        if mover == PlayerColor::Black {
            self.full_move_clock += 1;
        }

        self.next_player = mover.opponent();
        self.hasher.turn_increment();

        if let Some(file) = self.hashable_en_passant_file() {
            self.hasher.en_passant_increment(file);
        }

        self.king_in_check = [false; 2];
        self.checkmate = [false; 2];
        self.stalemate = false;
    }

    #[inline]
    fn hashable_en_passant_file(&self) -> Option<u8> {
        hashable_en_passant_file(&self.bit_boards, self.en_passant, self.next_player)
    }

    fn move_piece(&mut self, piece: Piece, from: Field, to: Field) {
        let bits = &mut self.bit_boards[piece.player.index()][piece.piece_type.index()];
        *bits = (*bits & !from.bit()) | to.bit();
        self.evaluator.move_increment(piece, from, to);
        self.hasher.move_increment(piece, from, to);
    }

    /// Remove the `victim`-coloured piece on `field`, if any.
    fn capture_at(&mut self, field: Field, victim: PlayerColor) -> bool {
        if self.bit_boards[victim.index()][ALL_PIECES] & field.bit() == 0 {
            return false;
        }
        let Some(captured) = self.piece_at(field) else {
            return false;
        };
        self.bit_boards[victim.index()][captured.piece_type.index()] &= !field.bit();
        self.evaluator.capture_increment(captured, field);
        self.hasher.capture_increment(captured, field);
        self.captured_pieces.push(captured);
        true
    }

    fn promote(&mut self, player: PlayerColor, field: Field, promoted: PieceType) {
        let boards = &mut self.bit_boards[player.index()];
        boards[PieceType::Pawn.index()] &= !field.bit();
        boards[promoted.index()] |= field.bit();
        self.evaluator.promotion_increment(player, field, promoted);
        self.hasher.promotion_increment(player, field, promoted);
    }

    pub(crate) fn update_all_pieces(&mut self) {
        for boards in &mut self.bit_boards {
            boards[ALL_PIECES] = boards[..ALL_PIECES].iter().fold(0, |acc, bb| acc | bb);
        }
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::standard()
    }
}

/// Captured pieces and status flags are not part of a position's identity.
impl PartialEq for ChessBoard {
    fn eq(&self, other: &Self) -> bool {
        self.bit_boards == other.bit_boards
            && self.castling_rights == other.castling_rights
            && self.en_passant == other.en_passant
            && self.next_player == other.next_player
            && self.evaluator == other.evaluator
            && self.hasher == other.hasher
    }
}

impl Eq for ChessBoard {}
