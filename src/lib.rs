//! Crate root module declarations for the chess3d engine core.
//!
//! This file exposes all subsystems (board representation, legal turn
//! generation, evaluation and hashing, Negamax search, the Polyglot opening
//! book, the background AI player and utility helpers) so tests, benches and
//! embedding applications can import stable module paths.

pub mod game_state {
    pub mod chess_board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod turn;
}

pub mod move_generation {
    pub mod bit_boards;
    pub mod perft;
    pub mod turn_generator;
}

pub mod search {
    pub mod board_scoring;
    pub mod negamax;
    pub mod polyglot_keys;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod tables {
    pub mod opening_book;
}

pub mod engines {
    pub mod ai_configuration;
    pub mod ai_player;
    pub mod mailbox;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
}

pub mod chess_errors;
