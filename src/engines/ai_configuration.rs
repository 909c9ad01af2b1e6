//! Settings for [`crate::engines::ai_player::AiPlayer`].

use std::path::PathBuf;
use std::time::Duration;

use crate::search::transposition_table::DEFAULT_TABLE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfiguration {
    /// Plies searched when the book has no entry.
    pub search_depth: u8,
    /// Polyglot book consulted before searching.
    pub book_path: Option<PathBuf>,
    /// Seed for the weighted book draw.
    pub seed: u64,
    pub transposition_table_size: usize,
    /// Budget after which `finish_turn` aborts the search.
    pub maximum_turn_time: Duration,
}

impl Default for AiConfiguration {
    fn default() -> Self {
        Self {
            search_depth: 4,
            book_path: None,
            seed: 5235,
            transposition_table_size: DEFAULT_TABLE_SIZE,
            maximum_turn_time: Duration::from_secs(30),
        }
    }
}

impl AiConfiguration {
    pub fn with_search_depth(mut self, search_depth: u8) -> Self {
        self.search_depth = search_depth;
        self
    }

    pub fn with_book_path(mut self, book_path: impl Into<PathBuf>) -> Self {
        self.book_path = Some(book_path.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_transposition_table_size(mut self, size: usize) -> Self {
        self.transposition_table_size = size.max(1);
        self
    }

    pub fn with_maximum_turn_time(mut self, maximum_turn_time: Duration) -> Self {
        self.maximum_turn_time = maximum_turn_time;
        self
    }
}
