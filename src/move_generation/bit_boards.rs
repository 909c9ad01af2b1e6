//! Bitboard masks, directional shifts and attack sets.
//!
//! Every shift that moves sideways is clipped by a file mask so pieces never
//! wrap from the h-file onto the a-file of the next rank (or back).

use crate::game_state::chess_types::{BitBoard, Field, PlayerColor};

pub const EMPTY: BitBoard = 0;
pub const FULL: BitBoard = !0;

pub const FILE_A: BitBoard = 0x0101_0101_0101_0101;
pub const FILE_B: BitBoard = FILE_A << 1;
pub const FILE_G: BitBoard = FILE_A << 6;
pub const FILE_H: BitBoard = FILE_A << 7;
pub const RANK_1: BitBoard = 0xFF;

#[inline]
pub const fn mask_rank(rank: u8) -> BitBoard {
    RANK_1 << (8 * rank as u32)
}

#[inline]
pub const fn mask_file(file: u8) -> BitBoard {
    FILE_A << file as u32
}

#[inline]
pub const fn clear_file(file: u8) -> BitBoard {
    !mask_file(file)
}

/// Ray direction on the board as seen from White.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Move every set bit one step in this direction.
    #[inline]
    pub const fn shift(self, bits: BitBoard) -> BitBoard {
        match self {
            Direction::North => bits << 8,
            Direction::South => bits >> 8,
            Direction::East => (bits << 1) & !FILE_A,
            Direction::West => (bits >> 1) & !FILE_H,
            Direction::NorthEast => (bits << 9) & !FILE_A,
            Direction::NorthWest => (bits << 7) & !FILE_H,
            Direction::SouthEast => (bits >> 7) & !FILE_A,
            Direction::SouthWest => (bits >> 9) & !FILE_H,
        }
    }
}

/// Occlusion fill: every square reached from `sliders` along `direction`,
/// stopping on (and including) the first non-empty square.
#[inline]
pub fn slide(sliders: BitBoard, empty: BitBoard, direction: Direction) -> BitBoard {
    let mut attacks = EMPTY;
    let mut ray = direction.shift(sliders);
    while ray != 0 {
        attacks |= ray;
        ray = direction.shift(ray & empty);
    }
    attacks
}

pub fn rook_attacks(rooks: BitBoard, empty: BitBoard) -> BitBoard {
    Direction::ORTHOGONAL
        .iter()
        .fold(EMPTY, |acc, &dir| acc | slide(rooks, empty, dir))
}

pub fn bishop_attacks(bishops: BitBoard, empty: BitBoard) -> BitBoard {
    Direction::DIAGONAL
        .iter()
        .fold(EMPTY, |acc, &dir| acc | slide(bishops, empty, dir))
}

#[inline]
pub fn queen_attacks(queens: BitBoard, empty: BitBoard) -> BitBoard {
    rook_attacks(queens, empty) | bishop_attacks(queens, empty)
}

pub const fn king_attacks(kings: BitBoard) -> BitBoard {
    let sideways = Direction::East.shift(kings) | Direction::West.shift(kings);
    let row = kings | sideways;
    sideways | Direction::North.shift(row) | Direction::South.shift(row)
}

pub const fn knight_attacks(knights: BitBoard) -> BitBoard {
    let one_right = (knights << 1) & !FILE_A;
    let two_right = (knights << 2) & !(FILE_A | FILE_B);
    let one_left = (knights >> 1) & !FILE_H;
    let two_left = (knights >> 2) & !(FILE_G | FILE_H);
    let one = one_right | one_left;
    let two = two_right | two_left;
    (one << 16) | (one >> 16) | (two << 8) | (two >> 8)
}

/// Diagonal capture squares only; pushes never attack.
pub const fn pawn_attacks(pawns: BitBoard, player: PlayerColor) -> BitBoard {
    match player {
        PlayerColor::White => {
            Direction::NorthEast.shift(pawns) | Direction::NorthWest.shift(pawns)
        }
        PlayerColor::Black => {
            Direction::SouthEast.shift(pawns) | Direction::SouthWest.shift(pawns)
        }
    }
}

/// One step forward for `player`'s pawns.
#[inline]
pub const fn pawn_push(pawns: BitBoard, player: PlayerColor) -> BitBoard {
    match player {
        PlayerColor::White => Direction::North.shift(pawns),
        PlayerColor::Black => Direction::South.shift(pawns),
    }
}

/// Squares strictly between two aligned fields; empty when not on a line.
pub fn between(a: Field, b: Field) -> BitBoard {
    let target = b.bit();
    for dir in Direction::ORTHOGONAL.into_iter().chain(Direction::DIAGONAL) {
        let ray = slide(a.bit(), !target, dir);
        if ray & target != 0 {
            return ray & !target;
        }
    }
    EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_in_corner_does_not_wrap() {
        let attacks = knight_attacks(Field::H1.bit());
        assert_eq!(attacks, Field::F2.bit() | Field::G3.bit());
        assert_eq!(knight_attacks(Field::D4.bit()).count_ones(), 8);
    }

    #[test]
    fn king_attacks_edges() {
        assert_eq!(king_attacks(Field::A1.bit()).count_ones(), 3);
        assert_eq!(king_attacks(Field::E4.bit()).count_ones(), 8);
        assert_eq!(king_attacks(Field::H8.bit()) & Field::A1.bit(), 0);
    }

    #[test]
    fn slider_stops_on_first_blocker() {
        let blocker = Field::D6.bit();
        let attacks = rook_attacks(Field::D4.bit(), !blocker);
        assert_ne!(attacks & Field::D6.bit(), 0);
        assert_eq!(attacks & Field::D7.bit(), 0);
        assert_eq!(attacks.count_ones(), 2 + 3 + 7);
    }

    #[test]
    fn pawn_attacks_stay_on_board() {
        assert_eq!(
            pawn_attacks(Field::A2.bit(), PlayerColor::White),
            Field::B3.bit()
        );
        assert_eq!(
            pawn_attacks(Field::H7.bit(), PlayerColor::Black),
            Field::G6.bit()
        );
    }

    #[test]
    fn between_on_lines_and_off_lines() {
        let diagonal = Field::B2.bit() | Field::C3.bit();
        assert_eq!(between(Field::A1, Field::D4), diagonal);
        assert_eq!(between(Field::E1, Field::E3), Field::E2.bit());
        assert_eq!(between(Field::A1, Field::B3), 0);
        assert_eq!(between(Field::A1, Field::B2), 0);
        assert_eq!(mask_rank(7) & Field::C8.bit(), Field::C8.bit());
        assert_eq!(clear_file(0) & Field::A5.bit(), 0);
    }
}
