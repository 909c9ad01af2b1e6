//! Perft node counting for move-generator regression.
//!
//! Walks the legal turn tree to a fixed depth and classifies leaf turns the
//! same way the published perft tables do.

use crate::game_state::game_state::GameState;
use crate::game_state::chess_types::PieceType;
use crate::game_state::turn::{Turn, TurnAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft(game_state: &GameState, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    for turn in game_state.turn_list() {
        perft_recurse(game_state, turn, depth, 1, &mut total);
    }
    total
}

/// Per-root-turn node counts, handy when bisecting a generator mismatch.
pub fn perft_divide(game_state: &GameState, depth: u8) -> Vec<(Turn, usize)> {
    game_state
        .turn_list()
        .iter()
        .map(|turn| {
            let mut counts = PerftCounts::default();
            perft_recurse(game_state, turn, depth.max(1), 1, &mut counts);
            (*turn, counts.nodes)
        })
        .collect()
}

fn perft_recurse(
    parent: &GameState,
    turn: &Turn,
    search_depth: u8,
    current_depth: u8,
    counts: &mut PerftCounts,
) {
    let mut child = parent.clone();
    child.advance(turn);

    if current_depth == search_depth {
        let mut leaf = PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
        let board = parent.board();
        let en_passant = turn.piece.piece_type == PieceType::Pawn
            && board.en_passant() == Some(turn.to)
            && turn.action == TurnAction::Move;
        if en_passant {
            leaf.en_passant = 1;
        }
        if en_passant || board.occupied_by(turn.piece.player.opponent()) & turn.to.bit() != 0 {
            leaf.captures = 1;
        }
        if turn.action == TurnAction::Castle {
            leaf.castles = 1;
        }
        if turn.is_promotion() {
            leaf.promotions = 1;
        }
        let defender = child.next_player();
        if child.board().is_king_in_check(defender) {
            leaf.checks = 1;
        }
        if child.board().is_checkmate(defender) {
            leaf.checkmates = 1;
        }
        counts.merge(leaf);
        return;
    }

    for next in child.turn_list() {
        perft_recurse(&child, next, search_depth, current_depth + 1, counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;

    fn state(fen: &str) -> GameState {
        GameState::from_fen(fen).expect("FEN should parse")
    }

    #[test]
    fn starting_position_counts() {
        let game = state(STARTING_POSITION_FEN);
        assert_eq!(perft(&game, 1).nodes, 20);
        assert_eq!(perft(&game, 2).nodes, 400);
        let d3 = perft(&game, 3);
        assert_eq!(d3.nodes, 8902);
        assert_eq!(d3.captures, 34);
        assert_eq!(d3.checks, 12);
        assert_eq!(d3.checkmates, 0);
    }

    #[test]
    fn kiwipete_counts() {
        let game = state("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        assert_eq!(perft(&game, 1).nodes, 48);
        let d2 = perft(&game, 2);
        assert_eq!(d2.nodes, 2039);
        assert_eq!(d2.captures, 351);
        assert_eq!(d2.en_passant, 1);
        assert_eq!(d2.castles, 91);
        assert_eq!(d2.checks, 3);
    }

    #[test]
    fn endgame_position_counts() {
        let game = state("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(perft(&game, 1).nodes, 14);
        assert_eq!(perft(&game, 2).nodes, 191);
        let d3 = perft(&game, 3);
        assert_eq!(d3.nodes, 2812);
        assert_eq!(d3.en_passant, 2);
        assert_eq!(d3.checks, 267);
    }

    #[test]
    fn promotion_heavy_position_counts() {
        let game = state("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
        assert_eq!(perft(&game, 1).nodes, 6);
        assert_eq!(perft(&game, 2).nodes, 264);
        assert_eq!(perft(&game, 3).nodes, 9467);
    }

    #[test]
    fn divide_sums_to_perft() {
        let game = state(STARTING_POSITION_FEN);
        let divided = perft_divide(&game, 2);
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<usize>(), 400);
    }
}
