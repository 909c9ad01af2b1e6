//! Computer player that answers turn requests on a background thread.
//!
//! A request first consults the opening book (weighted draw) and falls back to
//! a fixed-depth [`Negamax`] search. The chosen turn comes back over a channel;
//! the caller polls or waits for it. Lifecycle changes and chosen turns are
//! also posted to an optional [`Mailbox`] for observers on other threads.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::chess_errors::{ChessEngineError, ChessEngineResult};
use crate::engines::ai_configuration::AiConfiguration;
use crate::engines::mailbox::Mailbox;
use crate::game_state::chess_types::PlayerColor;
use crate::game_state::game_state::GameState;
use crate::game_state::turn::Turn;
use crate::search::negamax::{AbortHandle, Negamax};
use crate::tables::opening_book::PolyglotBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPlayerState {
    /// Idle, ready for the next turn request.
    Preparation,
    /// A turn is being computed.
    Playing,
    Stopped,
}

impl fmt::Display for AiPlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiPlayerState::Preparation => "PREPARATION",
            AiPlayerState::Playing => "PLAYING",
            AiPlayerState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// Where a chosen turn came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSource {
    Book,
    Search,
    /// Search aborted or no legal turn; the player passes.
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEvent {
    StateChanged(AiPlayerState),
    TurnChosen { turn: Turn, source: TurnSource },
}

/// Book plus search; lives behind a mutex so the table survives between turns.
#[derive(Debug)]
struct TurnFinder {
    book: PolyglotBook,
    negamax: Negamax,
    rng: StdRng,
    search_depth: u8,
}

impl TurnFinder {
    fn new(configuration: &AiConfiguration) -> Self {
        let mut book = PolyglotBook::new();
        if let Some(path) = &configuration.book_path {
            if let Err(error) = book.open(path) {
                warn!(
                    target: "chess3d_engine::ai",
                    path = %path.display(),
                    %error,
                    "opening book unavailable, using search only"
                );
            }
        }

        Self {
            book,
            negamax: Negamax::with_table_size(configuration.transposition_table_size),
            rng: StdRng::seed_from_u64(configuration.seed),
            search_depth: configuration.search_depth,
        }
    }

    fn book_turn(&mut self, state: &GameState) -> Option<Turn> {
        let entry = self.book.weighted_entry(state.hash(), &mut self.rng)?;
        let turn = entry.to_turn(state);
        if turn.is_none() {
            warn!(
                target: "chess3d_engine::book",
                %entry,
                "book entry is not a legal turn"
            );
        }
        turn
    }

    fn find_turn(&mut self, state: &GameState) -> (Turn, TurnSource) {
        if let Some(turn) = self.book_turn(state) {
            return (turn, TurnSource::Book);
        }

        debug!(
            target: "chess3d_engine::ai",
            depth = self.search_depth,
            "starting search"
        );
        let result = self.negamax.search(state, self.search_depth);
        match result.turn {
            Some(turn) => (turn, TurnSource::Search),
            None => (Turn::pass(state.next_player()), TurnSource::Pass),
        }
    }
}

#[derive(Debug)]
struct PendingTurn {
    player: PlayerColor,
    receiver: Receiver<(Turn, TurnSource)>,
    worker: JoinHandle<()>,
}

#[derive(Debug)]
pub struct AiPlayer {
    configuration: AiConfiguration,
    state: AiPlayerState,
    finder: Arc<Mutex<TurnFinder>>,
    abort_handle: AbortHandle,
    pending: Option<PendingTurn>,
    events: Option<Mailbox<AiEvent>>,
}

impl AiPlayer {
    pub fn new(configuration: AiConfiguration) -> Self {
        let finder = TurnFinder::new(&configuration);
        let abort_handle = finder.negamax.abort_handle();
        Self {
            configuration,
            state: AiPlayerState::Preparation,
            finder: Arc::new(Mutex::new(finder)),
            abort_handle,
            pending: None,
            events: None,
        }
    }

    /// Post state changes and chosen turns to `mailbox`.
    pub fn with_mailbox(mut self, mailbox: Mailbox<AiEvent>) -> Self {
        self.events = Some(mailbox);
        self
    }

    #[inline]
    pub fn state(&self) -> AiPlayerState {
        self.state
    }

    #[inline]
    pub fn configuration(&self) -> &AiConfiguration {
        &self.configuration
    }

    fn change_state(&mut self, state: AiPlayerState) {
        if self.state == state || self.state == AiPlayerState::Stopped {
            return;
        }
        info!(
            target: "chess3d_engine::ai",
            from = %self.state,
            to = %state,
            "state change"
        );
        self.state = state;
        if let Some(events) = &self.events {
            if events.post(AiEvent::StateChanged(state)).is_some() {
                warn!(
                    target: "chess3d_engine::ai",
                    "event mailbox full, oldest event dropped"
                );
            }
        }
    }

    /// Start computing a turn for the side to move in `game_state`.
    pub fn request_turn(&mut self, game_state: &GameState) -> ChessEngineResult<()> {
        if self.state != AiPlayerState::Preparation {
            return Err(ChessEngineError::InvalidPlayerState { state: self.state });
        }

        // Aborts aimed at an earlier request must not cancel this one.
        self.abort_handle.clear();

        let (sender, receiver) = mpsc::channel();
        let finder = Arc::clone(&self.finder);
        let game_state = game_state.clone();
        let player = game_state.next_player();

        let worker = thread::spawn(move || {
            let chosen = finder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .find_turn(&game_state);
            if sender.send(chosen).is_err() {
                debug!(
                    target: "chess3d_engine::ai",
                    "turn request was dropped before completion"
                );
            }
        });

        self.pending = Some(PendingTurn {
            player,
            receiver,
            worker,
        });
        self.change_state(AiPlayerState::Playing);
        Ok(())
    }

    /// Non-blocking check for the requested turn.
    pub fn poll_turn(&mut self) -> Option<Turn> {
        let pending = self.pending.as_ref()?;
        let chosen = match pending.receiver.try_recv() {
            Ok(chosen) => chosen,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => (Turn::pass(pending.player), TurnSource::Pass),
        };
        Some(self.complete(chosen))
    }

    /// Wait up to `timeout` for the requested turn.
    pub fn wait_turn(&mut self, timeout: Duration) -> Option<Turn> {
        let pending = self.pending.as_ref()?;
        let chosen = match pending.receiver.recv_timeout(timeout) {
            Ok(chosen) => chosen,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => (Turn::pass(pending.player), TurnSource::Pass),
        };
        Some(self.complete(chosen))
    }

    /// Wait for the requested turn within the configured maximum turn time,
    /// aborting the search when the budget runs out.
    pub fn finish_turn(&mut self) -> Option<Turn> {
        if let Some(turn) = self.wait_turn(self.configuration.maximum_turn_time) {
            return Some(turn);
        }
        let pending = self.pending.as_ref()?;
        warn!(
            target: "chess3d_engine::ai",
            budget = ?self.configuration.maximum_turn_time,
            "turn time exceeded, aborting search"
        );
        self.abort_handle.abort();
        let chosen = pending
            .receiver
            .recv()
            .unwrap_or((Turn::pass(pending.player), TurnSource::Pass));
        Some(self.complete(chosen))
    }

    /// Cancel the running request; it completes with a pass.
    pub fn abort(&self) {
        if self.state == AiPlayerState::Playing {
            info!(target: "chess3d_engine::ai", "abort requested");
            self.abort_handle.abort();
        }
    }

    /// Abort any running request and shut the player down for good.
    pub fn stop(&mut self) {
        if self.state == AiPlayerState::Stopped {
            return;
        }
        self.abort_handle.abort();
        self.join_worker();
        self.change_state(AiPlayerState::Stopped);
        info!(target: "chess3d_engine::ai", "AI player stopped");
    }

    fn complete(&mut self, (turn, source): (Turn, TurnSource)) -> Turn {
        self.join_worker();
        info!(target: "chess3d_engine::ai", %turn, ?source, "turn chosen");
        if let Some(events) = &self.events {
            if events.post(AiEvent::TurnChosen { turn, source }).is_some() {
                warn!(
                    target: "chess3d_engine::ai",
                    "event mailbox full, oldest event dropped"
                );
            }
        }
        self.change_state(AiPlayerState::Preparation);
        turn
    }

    fn join_worker(&mut self) {
        if let Some(pending) = self.pending.take() {
            if pending.worker.join().is_err() {
                warn!(target: "chess3d_engine::ai", "turn worker panicked");
            }
        }
    }
}

impl Drop for AiPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Field;

    const WAIT: Duration = Duration::from_secs(60);
    const SCHOLARS_MATE_FEN: &str =
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 2 3";

    fn book_path() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/mini_book.bin").to_owned()
    }

    #[test]
    fn book_turn_from_start_position() {
        let mailbox = Mailbox::new();
        let mut player = AiPlayer::new(AiConfiguration::default().with_book_path(book_path()))
            .with_mailbox(mailbox.clone());

        player
            .request_turn(&GameState::new_game())
            .expect("idle player accepts requests");
        assert_eq!(player.state(), AiPlayerState::Playing);
        let turn = player.wait_turn(WAIT).expect("book answers immediately");
        assert!(
            matches!(turn.from, Field::E2 | Field::D2 | Field::C2),
            "{turn}"
        );
        assert_eq!(player.state(), AiPlayerState::Preparation);

        let events = mailbox.drain();
        assert_eq!(
            events.first(),
            Some(&AiEvent::StateChanged(AiPlayerState::Playing))
        );
        assert!(events.contains(&AiEvent::TurnChosen {
            turn,
            source: TurnSource::Book
        }));
        assert_eq!(
            events.last(),
            Some(&AiEvent::StateChanged(AiPlayerState::Preparation))
        );
    }

    #[test]
    fn same_seed_same_book_choice() {
        let choose = || {
            let mut player = AiPlayer::new(
                AiConfiguration::default()
                    .with_book_path(book_path())
                    .with_seed(99),
            );
            player
                .request_turn(&GameState::new_game())
                .expect("request");
            player.wait_turn(WAIT).expect("book turn")
        };
        assert_eq!(choose(), choose());
    }

    #[test]
    fn searches_when_position_is_not_in_book() {
        let state = GameState::from_fen(SCHOLARS_MATE_FEN).expect("FEN");
        let mailbox = Mailbox::new();
        let mut player = AiPlayer::new(
            AiConfiguration::default()
                .with_book_path(book_path())
                .with_search_depth(2)
                .with_transposition_table_size(4099),
        )
        .with_mailbox(mailbox.clone());

        player.request_turn(&state).expect("request");
        let turn = player.finish_turn().expect("search completes");
        assert_eq!((turn.from, turn.to), (Field::F3, Field::F7));
        assert!(mailbox.drain().contains(&AiEvent::TurnChosen {
            turn,
            source: TurnSource::Search
        }));
    }

    #[test]
    fn missing_book_falls_back_to_search() {
        let mut player = AiPlayer::new(
            AiConfiguration::default()
                .with_book_path("no-such-book.bin")
                .with_search_depth(1)
                .with_transposition_table_size(101),
        );
        let state = GameState::new_game();
        player.request_turn(&state).expect("request");
        let turn = player.wait_turn(WAIT).expect("search completes");
        assert!(state.turn_list().contains(&turn));
    }

    #[test]
    fn aborted_request_passes() {
        let mut player = AiPlayer::new(
            AiConfiguration::default()
                .with_search_depth(12)
                .with_transposition_table_size(101),
        );
        player
            .request_turn(&GameState::new_game())
            .expect("request");
        assert_eq!(player.poll_turn(), None);
        player.abort();
        let turn = player
            .wait_turn(WAIT)
            .expect("aborted search still answers");
        assert_eq!(turn, Turn::pass(PlayerColor::White));
        assert_eq!(player.state(), AiPlayerState::Preparation);
    }

    #[test]
    fn turn_time_budget_aborts_search() {
        let mut player = AiPlayer::new(
            AiConfiguration::default()
                .with_search_depth(12)
                .with_transposition_table_size(101)
                .with_maximum_turn_time(Duration::from_millis(50)),
        );
        player
            .request_turn(&GameState::new_game())
            .expect("request");
        assert_eq!(player.finish_turn(), Some(Turn::pass(PlayerColor::White)));
    }

    #[test]
    fn busy_and_stopped_players_reject_requests() {
        let mut player = AiPlayer::new(
            AiConfiguration::default()
                .with_search_depth(12)
                .with_transposition_table_size(101),
        );
        let state = GameState::new_game();
        player.request_turn(&state).expect("first request");
        assert!(matches!(
            player.request_turn(&state),
            Err(ChessEngineError::InvalidPlayerState {
                state: AiPlayerState::Playing
            })
        ));

        player.stop();
        assert_eq!(player.state(), AiPlayerState::Stopped);
        assert_eq!(player.poll_turn(), None);
        assert!(matches!(
            player.request_turn(&state),
            Err(ChessEngineError::InvalidPlayerState {
                state: AiPlayerState::Stopped
            })
        ));
    }
}
