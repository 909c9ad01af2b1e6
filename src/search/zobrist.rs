//! Incremental Zobrist hashing using the Polyglot key layout.
//!
//! Hashes produced here can be used directly to query Polyglot opening books.
//! The board feeds every occupancy, castling, en-passant and side-to-move
//! change into [`IncrementalZobristHasher`]; [`hash_full_board`] is the
//! from-scratch reference the incremental value must always equal.

use crate::game_state::chess_board::ChessBoard;
use crate::game_state::chess_types::*;
use crate::move_generation::bit_boards::pawn_attacks;
use crate::search::polyglot_keys::{
    CASTLING_OFFSET, EN_PASSANT_OFFSET, PIECE_OFFSET, RANDOM64, TURN_OFFSET,
};

/// Polyglot piece kind: black pawn 0, white pawn 1, black knight 2, ...
#[inline]
const fn polyglot_kind(piece: Piece) -> usize {
    let base = match piece.piece_type {
        PieceType::Pawn => 0,
        PieceType::Knight => 2,
        PieceType::Bishop => 4,
        PieceType::Rook => 6,
        PieceType::Queen => 8,
        PieceType::King => 10,
    };
    match piece.player {
        PlayerColor::White => base + 1,
        PlayerColor::Black => base,
    }
}

/// Key for `piece` standing on `field`.
#[inline]
pub const fn piece_key(piece: Piece, field: Field) -> u64 {
    RANDOM64[PIECE_OFFSET + 64 * polyglot_kind(piece) + field.index()]
}

/// Key for one castling right bit (`CASTLE_*`).
#[inline]
pub fn castling_key(right: CastlingRights) -> u64 {
    debug_assert_eq!(right.count_ones(), 1);
    RANDOM64[CASTLING_OFFSET + right.trailing_zeros() as usize]
}

#[inline]
pub const fn en_passant_key(file: u8) -> u64 {
    RANDOM64[EN_PASSANT_OFFSET + file as usize]
}

/// XORed in while White is to move.
#[inline]
pub const fn turn_key() -> u64 {
    RANDOM64[TURN_OFFSET]
}

/// En-passant file as Polyglot counts it: only when a pawn of the side to
/// move stands ready to capture onto the target square.
pub fn hashable_en_passant_file(
    bit_boards: &[[BitBoard; 7]; 2],
    en_passant: Option<Field>,
    next_player: PlayerColor,
) -> Option<u8> {
    let target = en_passant?;
    let capturers = bit_boards[next_player.index()][PieceType::Pawn.index()];
    // Squares from which next_player's pawns attack the target.
    let origins = pawn_attacks(target.bit(), next_player.opponent());
    if capturers & origins != 0 {
        Some(target.file())
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncrementalZobristHasher {
    hash: Hash,
}

impl IncrementalZobristHasher {
    #[inline]
    pub const fn new(hash: Hash) -> Self {
        Self { hash }
    }

    pub fn from_board(board: &ChessBoard) -> Self {
        Self::new(hash_full_board(board))
    }

    #[inline]
    pub const fn hash(&self) -> Hash {
        self.hash
    }

    /// Toggle `piece` on `field` (placing and removing are the same XOR).
    #[inline]
    pub fn piece_increment(&mut self, piece: Piece, field: Field) {
        self.hash ^= piece_key(piece, field);
    }

    #[inline]
    pub fn move_increment(&mut self, piece: Piece, from: Field, to: Field) {
        self.hash ^= piece_key(piece, from) ^ piece_key(piece, to);
    }

    #[inline]
    pub fn capture_increment(&mut self, captured: Piece, field: Field) {
        self.piece_increment(captured, field);
    }

    /// Replace the pawn on `field` by `promoted`.
    #[inline]
    pub fn promotion_increment(&mut self, player: PlayerColor, field: Field, promoted: PieceType) {
        self.piece_increment(Piece::new(player, PieceType::Pawn), field);
        self.piece_increment(Piece::new(player, promoted), field);
    }

    /// Toggle every castling right set in `changed`.
    pub fn castling_increment(&mut self, changed: CastlingRights) {
        for right in [
            CASTLE_WHITE_SHORT,
            CASTLE_WHITE_LONG,
            CASTLE_BLACK_SHORT,
            CASTLE_BLACK_LONG,
        ] {
            if changed & right != 0 {
                self.hash ^= castling_key(right);
            }
        }
    }

    #[inline]
    pub fn en_passant_increment(&mut self, file: u8) {
        self.hash ^= en_passant_key(file);
    }

    #[inline]
    pub fn turn_increment(&mut self) {
        self.hash ^= turn_key();
    }
}

/// O(64) reference hash of a board.
pub fn hash_full_board(board: &ChessBoard) -> Hash {
    let mut hasher = IncrementalZobristHasher::default();
    let bit_boards = board.bit_boards();

    for player in [PlayerColor::White, PlayerColor::Black] {
        for piece_type in PieceType::ALL {
            let piece = Piece::new(player, piece_type);
            for field in fields_of(bit_boards[player.index()][piece_type.index()]) {
                hasher.piece_increment(piece, field);
            }
        }
    }

    hasher.castling_increment(board.castling_rights());

    if let Some(file) =
        hashable_en_passant_file(bit_boards, board.en_passant(), board.next_player())
    {
        hasher.en_passant_increment(file);
    }

    if board.next_player() == PlayerColor::White {
        hasher.turn_increment();
    }

    hasher.hash()
}

#[cfg(test)]
mod tests {
    use super::hash_full_board;
    use crate::game_state::chess_board::ChessBoard;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::game_state::GameState;
    use crate::utils::algebraic::algebraic_to_field;

    fn fen_hash(fen: &str) -> u64 {
        let board = ChessBoard::from_fen(fen).expect("FEN should parse");
        let full = hash_full_board(&board);
        assert_eq!(board.hash(), full, "incremental seed differs for {fen}");
        full
    }

    #[test]
    fn polyglot_reference_vectors() {
        let vectors = [
            (STARTING_POSITION_FEN, 0x463b96181691fc9c_u64),
            (
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
                0x823c9b50fd114196,
            ),
            (
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
                0x0756b94461c50fb0,
            ),
            (
                "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2",
                0x662fafb965db29d4,
            ),
            (
                "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
                0x22a48b5a8e47ff78,
            ),
            (
                "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPPKPPP/RNBQ1BNR b kq - 0 3",
                0x652a607ca3f242c1,
            ),
            (
                "rnbq1bnr/ppp1pkpp/8/3pPp2/8/8/PPPPKPPP/RNBQ1BNR w - - 0 4",
                0x00fdd303c946bdd9,
            ),
            (
                "rnbqkbnr/p1pppppp/8/8/PpP4P/8/1P1PPPP1/RNBQKBNR b KQkq c3 0 3",
                0x3c8123ea7b067637,
            ),
            (
                "rnbqkbnr/p1pppppp/8/8/P6P/R1p5/1P1PPPP1/1NBQKBNR b Kkq - 0 4",
                0x5c3f9b829b279560,
            ),
        ];
        for (fen, expected) in vectors {
            assert_eq!(fen_hash(fen), expected, "hash mismatch for {fen}");
        }
    }

    #[test]
    fn side_to_move_and_castling_change_hash() {
        let w = fen_hash("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let b = fen_hash("4k3/8/8/8/8/8/8/R3K2R b KQ - 0 1");
        let none = fen_hash("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_ne!(w, b);
        assert_ne!(w, none);
    }

    #[test]
    fn en_passant_counts_only_when_capturable() {
        // No black pawn next to e4: the e3 target must not change the hash.
        let with_target = fen_hash("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1");
        let without_target = fen_hash("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1");
        assert_eq!(with_target, without_target);

        let capturable = fen_hash("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1");
        let not_flagged = fen_hash("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1");
        assert_ne!(capturable, not_flagged);
    }

    #[test]
    fn incremental_hash_follows_played_turns() {
        let mut state = GameState::from_fen(STARTING_POSITION_FEN).expect("start FEN");
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("e4", "e5"), ("f7", "f5")] {
            let from = algebraic_to_field(from).expect("square should parse");
            let to = algebraic_to_field(to).expect("square should parse");
            let turn = state.find_turn(from, to, None).expect("legal turn");
            state.apply_turn(&turn);
            assert_eq!(state.hash(), hash_full_board(state.board()));
        }
        assert_eq!(state.hash(), 0x22a48b5a8e47ff78);
    }
}
