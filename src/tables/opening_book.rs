//! Polyglot opening-book support.
//!
//! A Polyglot book is a flat file of 16-byte big-endian records sorted by
//! position key:
//!
//! | bytes | content |
//! |-------|---------|
//! | 0..8  | Zobrist key of the position |
//! | 8..10 | move |
//! | 10..12 | weight |
//! | 12..16 | learn data |
//!
//! Keys use the Polyglot random table, which [`crate::search::zobrist`]
//! reproduces, so a book lookup is simply `book.lookup(state.hash())`.

use std::fs;
use std::path::Path;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::game_state::chess_types::{Field, Hash, PieceType};
use crate::game_state::game_state::GameState;
use crate::game_state::turn::{Turn, TurnAction};

const RECORD_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("failed reading opening book: {0}")]
    Io(#[from] std::io::Error),
    #[error("opening book size {len} is not a multiple of 16 bytes")]
    Truncated { len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyglotBookEntry {
    pub key: Hash,
    pub from: Field,
    pub to: Field,
    pub promotion: Option<PieceType>,
    pub weight: u16,
    pub learn: u32,
}

impl PolyglotBookEntry {
    fn decode(record: &[u8]) -> Self {
        let key = be_bytes(&record[0..8]);
        let raw_move = be_bytes(&record[8..10]) as u16;

        let to_file = (raw_move & 0x7) as u8;
        let to_rank = ((raw_move >> 3) & 0x7) as u8;
        let from_file = ((raw_move >> 6) & 0x7) as u8;
        let from_rank = ((raw_move >> 9) & 0x7) as u8;
        let promotion = match (raw_move >> 12) & 0x7 {
            1 => Some(PieceType::Knight),
            2 => Some(PieceType::Bishop),
            3 => Some(PieceType::Rook),
            4 => Some(PieceType::Queen),
            _ => None,
        };

        Self {
            key,
            from: Field::ALL[usize::from(from_rank * 8 + from_file)],
            to: Field::ALL[usize::from(to_rank * 8 + to_file)],
            promotion,
            weight: be_bytes(&record[10..12]) as u16,
            learn: be_bytes(&record[12..16]) as u32,
        }
    }

    /// Polyglot writes castling as "king takes own rook" (e1h1, e1a1, ...).
    /// Returns the king's real destination when the entry has that shape.
    pub fn king_castling_target(&self) -> Option<Field> {
        match (self.from, self.to) {
            (Field::E1, Field::H1) => Some(Field::G1),
            (Field::E1, Field::A1) => Some(Field::C1),
            (Field::E8, Field::H8) => Some(Field::G8),
            (Field::E8, Field::A8) => Some(Field::C8),
            _ => None,
        }
    }

    #[inline]
    pub fn might_be_castling(&self) -> bool {
        self.king_castling_target().is_some()
    }

    /// The legal turn in `state` this entry describes, if any.
    pub fn to_turn(&self, state: &GameState) -> Option<Turn> {
        if let Some(target) = self.king_castling_target() {
            let castle = state
                .find_turn(self.from, target, None)
                .filter(|turn| turn.action == TurnAction::Castle);
            if castle.is_some() {
                return castle;
            }
        }
        state.find_turn(self.from, self.to, self.promotion)
    }
}

impl std::fmt::Display for PolyglotBookEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x} {}{}", self.key, self.from, self.to)?;
        if let Some(piece_type) = self.promotion {
            write!(f, "{}", piece_type.fen_char())?;
        }
        write!(f, " weight {}", self.weight)
    }
}

fn be_bytes(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

/// In-memory Polyglot book, held sorted by key.
#[derive(Debug, Clone, Default)]
pub struct PolyglotBook {
    entries: Vec<PolyglotBookEntry>,
}

impl PolyglotBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a book file. On failure the book is left empty.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), BookError> {
        let path = path.as_ref();
        let result = fs::read(path)
            .map_err(BookError::from)
            .and_then(|bytes| self.load_bytes(&bytes));

        match &result {
            Ok(()) => info!(
                target: "chess3d_engine::book",
                path = %path.display(),
                entries = self.len(),
                "loaded opening book"
            ),
            Err(error) => {
                self.entries.clear();
                debug!(
                    target: "chess3d_engine::book",
                    path = %path.display(),
                    %error,
                    "opening book not loaded"
                );
            }
        }
        result
    }

    /// Replace the book with the records in `bytes`.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), BookError> {
        self.entries.clear();
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(BookError::Truncated { len: bytes.len() });
        }

        self.entries = bytes
            .chunks_exact(RECORD_SIZE)
            .map(PolyglotBookEntry::decode)
            .collect();
        self.entries.sort_by_key(|entry| entry.key);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries for `key`, in file order.
    pub fn lookup(&self, key: Hash) -> &[PolyglotBookEntry] {
        let start = self.entries.partition_point(|entry| entry.key < key);
        let end = self.entries.partition_point(|entry| entry.key <= key);
        &self.entries[start..end]
    }

    /// Draw an entry with probability `weight / sum(weights)`.
    /// A range whose weights are all zero is drawn uniformly.
    pub fn weighted_entry<R: Rng + ?Sized>(
        &self,
        key: Hash,
        rng: &mut R,
    ) -> Option<PolyglotBookEntry> {
        let options = self.lookup(key);
        if options.is_empty() {
            return None;
        }

        let total_weight: u64 = options.iter().map(|e| u64::from(e.weight)).sum();
        if total_weight == 0 {
            return Some(options[rng.random_range(0..options.len())]);
        }

        let mut pick = rng.random_range(0..total_weight);
        for entry in options {
            let weight = u64::from(entry.weight);
            if pick < weight {
                return Some(*entry);
            }
            pick -= weight;
        }

        options.last().copied()
    }

    /// First entry with the highest weight.
    pub fn best_entry(&self, key: Hash) -> Option<PolyglotBookEntry> {
        // max_by_key keeps the last maximum, so walk the range backwards.
        self.lookup(key)
            .iter()
            .rev()
            .max_by_key(|entry| entry.weight)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::game_state::chess_types::PlayerColor;

    const MINI_BOOK: &[u8] = include_bytes!("../../tests/data/mini_book.bin");
    const START: Hash = 0x463b96181691fc9c;
    const AFTER_D4: &str = "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1";
    const ITALIAN_BEFORE_CASTLING: &str =
        "r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

    fn mini_book() -> PolyglotBook {
        let mut book = PolyglotBook::new();
        book.load_bytes(MINI_BOOK).expect("fixture should load");
        book
    }

    #[test]
    fn decodes_move_bits() {
        // e2e4, weight 181
        let record = [
            0x46, 0x3b, 0x96, 0x18, 0x16, 0x91, 0xfc, 0x9c, 0x03, 0x1c, 0x00, 0xb5, 0, 0, 0, 7,
        ];
        let entry = PolyglotBookEntry::decode(&record);
        assert_eq!(entry.key, START);
        assert_eq!((entry.from, entry.to), (Field::E2, Field::E4));
        assert_eq!(entry.promotion, None);
        assert_eq!(entry.weight, 181);
        assert_eq!(entry.learn, 7);
    }

    #[test]
    fn lookup_returns_equal_key_range_in_file_order() {
        let book = mini_book();
        assert_eq!(book.len(), 10);
        let moves: Vec<(Field, Field, u16)> = book
            .lookup(START)
            .iter()
            .map(|e| (e.from, e.to, e.weight))
            .collect();
        assert_eq!(
            moves,
            vec![
                (Field::E2, Field::E4, 181),
                (Field::D2, Field::D4, 157),
                (Field::C2, Field::C4, 16)
            ]
        );

        let single = book.lookup(0x2913395f747c);
        assert_eq!(single.len(), 1);
        assert_eq!(
            (single[0].from, single[0].to, single[0].weight),
            (Field::D4, Field::D5, 6)
        );

        assert!(book.lookup(0).is_empty());
        assert!(book.lookup(u64::MAX).is_empty());
    }

    #[test]
    fn best_entry_is_heaviest() {
        let book = mini_book();
        let best = book.best_entry(START).expect("start is in the book");
        assert_eq!((best.from, best.to), (Field::E2, Field::E4));
        assert_eq!(book.best_entry(0), None);
    }

    #[test]
    fn weighted_draw_follows_weights() {
        let book = mini_book();
        let mut rng = StdRng::seed_from_u64(5235);
        let mut counts = [0usize; 3];
        let tries = 20_000;
        for _ in 0..tries {
            let entry = book
                .weighted_entry(START, &mut rng)
                .expect("start is in the book");
            let slot = match entry.from {
                Field::E2 => 0,
                Field::D2 => 1,
                Field::C2 => 2,
                other => panic!("unexpected book move from {other}"),
            };
            counts[slot] += 1;
        }

        let total = f64::from(181 + 157 + 16);
        for (count, weight) in counts.iter().zip([181.0, 157.0, 16.0]) {
            let observed = *count as f64 / tries as f64;
            assert!((observed - weight / total).abs() < 0.02, "{counts:?}");
        }
    }

    #[test]
    fn zero_weights_draw_uniformly() {
        let book = mini_book();
        let after_d4 = GameState::from_fen(AFTER_D4).expect("FEN");
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = [false; 2];
        for _ in 0..200 {
            let entry = book
                .weighted_entry(after_d4.hash(), &mut rng)
                .expect("position is in the book");
            assert_eq!(entry.weight, 0);
            seen[usize::from(entry.from == Field::D7)] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn truncated_input_leaves_book_empty() {
        let mut book = mini_book();
        let error = book
            .load_bytes(&MINI_BOOK[..17])
            .expect_err("17 bytes is not a record multiple");
        assert!(matches!(error, BookError::Truncated { len: 17 }));
        assert!(book.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut book = mini_book();
        let error = book
            .open("book-that-does-not-exist.bin")
            .expect_err("file is missing");
        assert!(matches!(error, BookError::Io(_)));
        assert!(book.is_empty());
    }

    #[test]
    fn king_takes_rook_maps_to_castling_turn() {
        let book = mini_book();
        let state = GameState::from_fen(ITALIAN_BEFORE_CASTLING).expect("FEN");
        let entry = book.best_entry(state.hash()).expect("book position");
        assert!(entry.might_be_castling());
        assert_eq!((entry.from, entry.to), (Field::E1, Field::H1));

        let turn = entry.to_turn(&state).expect("castling is legal");
        assert_eq!(turn.action, TurnAction::Castle);
        assert_eq!((turn.from, turn.to), (Field::E1, Field::G1));
    }

    #[test]
    fn promotion_entry_maps_to_under_promotion() {
        let book = mini_book();
        let state = GameState::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").expect("FEN");
        let entry = book.best_entry(state.hash()).expect("book position");
        assert_eq!(entry.promotion, Some(PieceType::Knight));
        let turn = entry.to_turn(&state).expect("promotion is legal");
        assert_eq!(turn.action, TurnAction::PromotionKnight);
        assert_eq!(turn.piece.player, PlayerColor::White);
    }

    #[test]
    fn plain_entry_maps_to_move() {
        let book = mini_book();
        let state = GameState::new_game();
        let entry = book.best_entry(state.hash()).expect("start is in the book");
        assert!(!entry.might_be_castling());
        let turn = entry.to_turn(&state).expect("e2e4 is legal");
        assert_eq!(turn.to_string(), "e2e4");
    }
}
