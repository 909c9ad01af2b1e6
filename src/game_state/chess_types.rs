//! Core value types shared across the engine.
//!
//! Squares, colours, piece types and the bitboard/score/hash aliases used by
//! the board representation, move generation and search.

use std::fmt;

/// One bit per square, `a1 == bit 0`, `h8 == bit 63`.
pub type BitBoard = u64;

/// Centipawn score.
pub type Score = i32;

/// Polyglot-compatible 64-bit position hash.
pub type Hash = u64;

/// Side to move / owner of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PlayerColor::White => 0,
            PlayerColor::Black => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }
}

/// Piece type (colour is carried separately in [`Piece`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::King,
        PieceType::Queen,
        PieceType::Bishop,
        PieceType::Knight,
        PieceType::Rook,
        PieceType::Pawn,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceType::King => 0,
            PieceType::Queen => 1,
            PieceType::Bishop => 2,
            PieceType::Knight => 3,
            PieceType::Rook => 4,
            PieceType::Pawn => 5,
        }
    }

    /// Lowercase FEN letter.
    pub const fn fen_char(self) -> char {
        match self {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Pawn => 'p',
        }
    }
}

/// A coloured piece. Empty squares are `Option<Piece>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub player: PlayerColor,
    pub piece_type: PieceType,
}

impl Piece {
    #[inline]
    pub const fn new(player: PlayerColor, piece_type: PieceType) -> Self {
        Self { player, piece_type }
    }

    pub fn from_fen_char(ch: char) -> Option<Self> {
        let player = if ch.is_ascii_uppercase() {
            PlayerColor::White
        } else {
            PlayerColor::Black
        };
        let piece_type = match ch.to_ascii_lowercase() {
            'k' => PieceType::King,
            'q' => PieceType::Queen,
            'b' => PieceType::Bishop,
            'n' => PieceType::Knight,
            'r' => PieceType::Rook,
            'p' => PieceType::Pawn,
            _ => return None,
        };
        Some(Self::new(player, piece_type))
    }

    pub fn fen_char(self) -> char {
        let ch = self.piece_type.fen_char();
        match self.player {
            PlayerColor::White => ch.to_ascii_uppercase(),
            PlayerColor::Black => ch,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen_char())
    }
}

/// Board square, `A1 == 0` .. `H8 == 63` (rank-major).
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Field {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Field {
    #[rustfmt::skip]
    pub const ALL: [Field; 64] = {
        use Field::*;
        [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ]
    };

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Option<Field> {
        if index < 64 {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// File/rank are zero-based (`a == 0`, rank 1 `== 0`).
    #[inline]
    pub const fn from_file_rank(file: u8, rank: u8) -> Option<Field> {
        if file < 8 && rank < 8 {
            Some(Self::ALL[(rank * 8 + file) as usize])
        } else {
            None
        }
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self as u8 % 8
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8 / 8
    }

    #[inline]
    pub const fn bit(self) -> BitBoard {
        1u64 << (self as u8)
    }

    /// Lowest set square of a non-empty bitboard.
    #[inline]
    pub fn first_of(bits: BitBoard) -> Option<Field> {
        if bits == 0 {
            None
        } else {
            Self::from_index(bits.trailing_zeros() as usize)
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.file());
        let rank = char::from(b'1' + self.rank());
        write!(f, "{file}{rank}")
    }
}

/// Iterator over the set squares of a bitboard, lowest first.
#[derive(Debug, Clone, Copy)]
pub struct FieldIter(BitBoard);

impl Iterator for FieldIter {
    type Item = Field;

    #[inline]
    fn next(&mut self) -> Option<Field> {
        let field = Field::first_of(self.0)?;
        self.0 &= self.0 - 1;
        Some(field)
    }
}

#[inline]
pub fn fields_of(bits: BitBoard) -> FieldIter {
    FieldIter(bits)
}

/// Castling rights bitmask, in Polyglot key order.
pub type CastlingRights = u8;
pub const CASTLE_WHITE_SHORT: CastlingRights = 1 << 0;
pub const CASTLE_WHITE_LONG: CastlingRights = 1 << 1;
pub const CASTLE_BLACK_SHORT: CastlingRights = 1 << 2;
pub const CASTLE_BLACK_LONG: CastlingRights = 1 << 3;
pub const CASTLE_ALL: CastlingRights = 0x0F;

#[inline]
pub const fn castle_short_right(player: PlayerColor) -> CastlingRights {
    match player {
        PlayerColor::White => CASTLE_WHITE_SHORT,
        PlayerColor::Black => CASTLE_BLACK_SHORT,
    }
}

#[inline]
pub const fn castle_long_right(player: PlayerColor) -> CastlingRights {
    match player {
        PlayerColor::White => CASTLE_WHITE_LONG,
        PlayerColor::Black => CASTLE_BLACK_LONG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_coordinates_round_trip() {
        assert_eq!(Field::from_file_rank(4, 3), Some(Field::E4));
        assert_eq!(Field::E4.file(), 4);
        assert_eq!(Field::E4.rank(), 3);
        assert_eq!(Field::from_index(63), Some(Field::H8));
        assert_eq!(Field::from_index(64), None);
        assert_eq!(Field::from_file_rank(8, 0), None);
        assert_eq!(Field::H8.to_string(), "h8");
    }

    #[test]
    fn field_iteration_is_lowest_first() {
        let bits = Field::C3.bit() | Field::A1.bit() | Field::H8.bit();
        let fields: Vec<Field> = fields_of(bits).collect();
        assert_eq!(fields, vec![Field::A1, Field::C3, Field::H8]);
    }

    #[test]
    fn fen_chars_map_both_ways() {
        let piece = Piece::from_fen_char('N').expect("N is a knight");
        assert_eq!(piece, Piece::new(PlayerColor::White, PieceType::Knight));
        assert_eq!(piece.fen_char(), 'N');
        assert_eq!(Piece::from_fen_char('x'), None);
        assert_eq!(PlayerColor::Black.opponent(), PlayerColor::White);
    }
}
