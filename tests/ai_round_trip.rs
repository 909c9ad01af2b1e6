use std::time::Duration;

use chess3d_engine::engines::ai_configuration::AiConfiguration;
use chess3d_engine::engines::ai_player::{AiEvent, AiPlayer, AiPlayerState, TurnSource};
use chess3d_engine::engines::mailbox::Mailbox;
use chess3d_engine::game_state::chess_types::PlayerColor;
use chess3d_engine::game_state::game_state::GameState;

const MINI_BOOK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/mini_book.bin");

fn configuration(seed: u64) -> AiConfiguration {
    AiConfiguration::default()
        .with_book_path(MINI_BOOK)
        .with_seed(seed)
        .with_search_depth(2)
        .with_transposition_table_size(65_537)
        .with_maximum_turn_time(Duration::from_secs(120))
}

#[test]
fn two_ai_players_exchange_legal_turns() {
    let events = Mailbox::new();
    let mut white = AiPlayer::new(configuration(1)).with_mailbox(events.clone());
    let mut black = AiPlayer::new(configuration(2)).with_mailbox(events.clone());

    let mut game = GameState::new_game();
    let mut sources = Vec::new();
    for _ply in 0..6 {
        let player = match game.next_player() {
            PlayerColor::White => &mut white,
            PlayerColor::Black => &mut black,
        };
        player
            .request_turn(&game)
            .expect("idle player accepts a request");
        let turn = player.finish_turn().expect("a turn is produced");
        assert!(game.turn_list().contains(&turn), "{turn} is not legal");
        game.apply_turn(&turn);

        for event in events.drain() {
            if let AiEvent::TurnChosen { source, .. } = event {
                sources.push(source);
            }
        }
    }

    assert_eq!(sources.len(), 6);
    assert_eq!(sources[0], TurnSource::Book);
    assert!(sources.contains(&TurnSource::Search));
    assert!(!sources.contains(&TurnSource::Pass));

    white.stop();
    black.stop();
    assert_eq!(white.state(), AiPlayerState::Stopped);
    let stopped = AiEvent::StateChanged(AiPlayerState::Stopped);
    assert!(events.drain().contains(&stopped));
}
