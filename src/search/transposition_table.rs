//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! Direct indexing (`hash % size`) into a prime-sized slot array. A lookup only
//! hits when the stored hash equals the probed one, which rules out slot
//! collisions between different hashes; two positions sharing one 64-bit hash
//! remain indistinguishable.

use crate::game_state::chess_types::{Hash, Score};
use crate::game_state::turn::Turn;

/// Prime slot count used by default.
pub const DEFAULT_TABLE_SIZE: usize = 1_048_583;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub hash: Hash,
    pub turn: Option<Turn>,
    pub score: Score,
    pub bound: Bound,
    pub depth: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub lookups: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    stats: TTStats,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_SIZE)
    }
}

impl TranspositionTable {
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![None; size.max(1)],
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.stats = TTStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    #[inline]
    fn idx(&self, hash: Hash) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    pub fn lookup(&mut self, hash: Hash) -> Option<TTEntry> {
        self.stats.lookups += 1;
        let hit = self.entries[self.idx(hash)].filter(|e| e.hash == hash);
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    /// Store `entry`, keeping an existing entry only when it describes the
    /// same position from a deeper search.
    pub fn update(&mut self, entry: TTEntry) {
        self.stats.stores += 1;
        let idx = self.idx(entry.hash);
        let keep_existing = matches!(
            self.entries[idx],
            Some(existing) if existing.hash == entry.hash && existing.depth > entry.depth
        );
        if !keep_existing {
            self.entries[idx] = Some(entry);
        }
    }
}
