use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess3d_engine::game_state::chess_rules::STARTING_POSITION_FEN;
use chess3d_engine::game_state::game_state::GameState;
use chess3d_engine::search::negamax::Negamax;

const CASES: &[(&str, &str)] = &[
    ("startpos", STARTING_POSITION_FEN),
    (
        "classical_mid",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    ),
    (
        "tactical",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ("end_kpk", "8/8/8/8/8/4k3/4P3/4K3 w - - 0 1"),
];

const TABLE_SIZE: usize = 65_537;

fn bench_search(c: &mut Criterion) {
    let depth = std::env::var("CHESS3D_SEARCH_DEPTH")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(3)
        .max(1);

    let mut group = c.benchmark_group("negamax");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(10);

    for (name, fen) in CASES {
        let game = GameState::from_fen(fen).expect("benchmark FEN should parse");

        // Pruning must not change the result.
        if depth <= 3 {
            let mut full = Negamax::<true, true, true>::with_table_size(TABLE_SIZE);
            let mut plain = Negamax::<false, false, false>::with_table_size(1);
            assert_eq!(
                full.search(&game, depth).score,
                plain.search(&game, depth).score,
                "{name}: pruned and plain search disagree"
            );
        }

        group.bench_with_input(BenchmarkId::new(*name, format!("d{depth}")), &game, |b, game| {
            b.iter(|| {
                // Fresh table per iteration so every run does the same work.
                let mut negamax: Negamax = Negamax::with_table_size(TABLE_SIZE);
                black_box(negamax.search(black_box(game), black_box(depth)))
            });
        });

        group.bench_with_input(
            BenchmarkId::new(format!("{name}_alpha_beta_only"), format!("d{depth}")),
            &game,
            |b, game| {
                b.iter(|| {
                    let mut negamax = Negamax::<true, false, false>::with_table_size(1);
                    black_box(negamax.search(black_box(game), black_box(depth)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(negamax_benches, bench_search);
criterion_main!(negamax_benches);
