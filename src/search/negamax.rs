//! Negamax game-tree search with alpha-beta pruning, move ordering and a
//! transposition table.
//!
//! The three features are const-generic switches so every combination can be
//! cross-checked against the others: for a fixed position and depth they must
//! all return the same score. Cancellation is cooperative through an atomic
//! flag that another thread may set while a search is running.

use std::cmp::Reverse;
use std::sync::atomic::{self, AtomicBool};
use std::sync::Arc;

use tracing::debug;

use crate::game_state::chess_types::{Hash, Score};
use crate::game_state::game_state::GameState;
use crate::game_state::turn::Turn;
use crate::search::transposition_table::{
    Bound, TTEntry, TranspositionTable, DEFAULT_TABLE_SIZE,
};

/// Window bound; larger than any reachable score.
pub const INFINITY: Score = Score::MAX / 2;

/// What the search needs from a position.
pub trait SearchState: Clone {
    fn turns(&self) -> &[Turn];
    fn apply_turn(&mut self, turn: &Turn);
    fn is_game_over(&self) -> bool;
    /// Score from the side to move's point of view.
    fn score(&self) -> Score;
    fn hash(&self) -> Hash;
}

impl SearchState for GameState {
    #[inline]
    fn turns(&self) -> &[Turn] {
        self.turn_list()
    }

    #[inline]
    fn apply_turn(&mut self, turn: &Turn) {
        self.advance(turn);
    }

    #[inline]
    fn is_game_over(&self) -> bool {
        GameState::is_game_over(self)
    }

    #[inline]
    fn score(&self) -> Score {
        GameState::score(self)
    }

    #[inline]
    fn hash(&self) -> Hash {
        GameState::hash(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub score: Score,
    /// `None` at leaves and when the search was aborted.
    pub turn: Option<Turn>,
}

impl From<TTEntry> for SearchResult {
    fn from(entry: TTEntry) -> Self {
        Self {
            score: entry.score,
            turn: entry.turn,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub tt_hits: u64,
    pub cutoffs: u64,
}

/// Cloneable handle that stops a running search from another thread.
#[derive(Debug, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, atomic::Ordering::Relaxed);
    }

    /// Withdraw an abort that no search has consumed yet.
    pub fn clear(&self) {
        self.0.store(false, atomic::Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct Negamax<
    const ALPHA_BETA: bool = true,
    const MOVE_ORDERING: bool = true,
    const TRANSPOSITION_TABLES: bool = true,
> {
    table: TranspositionTable,
    abort_flag: Arc<AtomicBool>,
    stats: SearchStats,
}

impl<const ALPHA_BETA: bool, const MOVE_ORDERING: bool, const TRANSPOSITION_TABLES: bool> Default
    for Negamax<ALPHA_BETA, MOVE_ORDERING, TRANSPOSITION_TABLES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const ALPHA_BETA: bool, const MOVE_ORDERING: bool, const TRANSPOSITION_TABLES: bool>
    Negamax<ALPHA_BETA, MOVE_ORDERING, TRANSPOSITION_TABLES>
{
    pub fn new() -> Self {
        Self::with_table_size(DEFAULT_TABLE_SIZE)
    }

    pub fn with_table_size(size: usize) -> Self {
        // Without the table feature the slots are never touched.
        let size = if TRANSPOSITION_TABLES { size } else { 1 };
        Self {
            table: TranspositionTable::new(size),
            abort_flag: Arc::new(AtomicBool::new(false)),
            stats: SearchStats::default(),
        }
    }

    /// Request cancellation of the running (or next) search.
    pub fn abort(&self) {
        self.abort_flag.store(true, atomic::Ordering::Relaxed);
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(Arc::clone(&self.abort_flag))
    }

    #[inline]
    fn aborted(&self) -> bool {
        self.abort_flag.load(atomic::Ordering::Relaxed)
    }

    /// Counters of the last search.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Best turn for the side to move, searching `max_depth` plies.
    ///
    /// The score is from the side to move's point of view. An aborted search
    /// returns score 0 and no turn; the abort flag is cleared on return.
    pub fn search<S: SearchState>(&mut self, state: &S, max_depth: u8) -> SearchResult {
        self.stats = SearchStats::default();
        let result = self.negamax(state, max_depth, -INFINITY, INFINITY);
        let aborted = self.abort_flag.swap(false, atomic::Ordering::Relaxed);

        match result {
            Some(result) if !aborted => {
                debug!(
                    target: "chess3d_engine::search",
                    depth = max_depth,
                    score = result.score,
                    turn = ?result.turn,
                    nodes = self.stats.nodes,
                    tt_hits = self.stats.tt_hits,
                    cutoffs = self.stats.cutoffs,
                    "search finished"
                );
                result
            }
            _ => {
                debug!(
                    target: "chess3d_engine::search",
                    nodes = self.stats.nodes,
                    "search aborted"
                );
                SearchResult {
                    score: 0,
                    turn: None,
                }
            }
        }
    }

    /// `None` once the abort flag is seen.
    fn negamax<S: SearchState>(
        &mut self,
        state: &S,
        remaining: u8,
        mut alpha: Score,
        mut beta: Score,
    ) -> Option<SearchResult> {
        if self.aborted() {
            return None;
        }
        self.stats.nodes += 1;

        if remaining == 0 || state.is_game_over() {
            return Some(SearchResult {
                score: state.score(),
                turn: None,
            });
        }

        let original_alpha = alpha;
        if TRANSPOSITION_TABLES {
            if let Some(entry) = self.table.lookup(state.hash()) {
                if entry.depth >= remaining {
                    self.stats.tt_hits += 1;
                    match entry.bound {
                        Bound::Exact => return Some(entry.into()),
                        Bound::Lower => alpha = alpha.max(entry.score),
                        Bound::Upper => beta = beta.min(entry.score),
                    }
                    if alpha >= beta {
                        return Some(entry.into());
                    }
                }
            }
        }

        let mut children: Vec<(Turn, S)> = state
            .turns()
            .iter()
            .map(|turn| {
                let mut child = state.clone();
                child.apply_turn(turn);
                (*turn, child)
            })
            .collect();

        if MOVE_ORDERING {
            let mut keyed: Vec<(Score, (Turn, S))> = children
                .into_iter()
                .map(|(turn, child)| (self.estimate(&child), (turn, child)))
                .collect();
            keyed.sort_by_key(|(estimate, _)| Reverse(*estimate));
            children = keyed.into_iter().map(|(_, child)| child).collect();
        }

        let mut best = SearchResult {
            score: -INFINITY,
            turn: None,
        };
        for (turn, child) in &children {
            let (child_alpha, child_beta) = if ALPHA_BETA {
                (-beta, -alpha)
            } else {
                (-INFINITY, INFINITY)
            };
            let result = self.negamax(child, remaining - 1, child_alpha, child_beta)?;
            let score = -result.score;
            if score > best.score {
                best = SearchResult {
                    score,
                    turn: Some(*turn),
                };
            }
            alpha = alpha.max(score);
            if ALPHA_BETA && alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if TRANSPOSITION_TABLES {
            let bound = if best.score <= original_alpha {
                Bound::Upper
            } else if best.score >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.table.update(TTEntry {
                hash: state.hash(),
                turn: best.turn,
                score: best.score,
                bound,
                depth: remaining,
            });
        }

        Some(best)
    }

    /// Cheap value of a child from the parent's point of view.
    fn estimate<S: SearchState>(&mut self, child: &S) -> Score {
        if TRANSPOSITION_TABLES {
            if let Some(entry) = self.table.lookup(child.hash()) {
                return -entry.score;
            }
        }
        -child.score()
    }
}
