use std::sync::atomic::AtomicBool;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kickoff_core::{Board, Player};
use kickoff_search::{search, SearchConfig};

fn bench_search(c: &mut Criterion) {
    let cancel = AtomicBool::new(false);

    let mut narrow = Board::new(2, 2);
    narrow.set_current_player(Player::Two);
    c.bench_function("search_2x2_depth_6", |b| {
        b.iter(|| search(black_box(&narrow), &SearchConfig::default(), &cancel))
    });

    let board = Board::new(4, 4);
    for depth in [2, 3] {
        let config = SearchConfig {
            depth,
            ..SearchConfig::default()
        };
        c.bench_function(&format!("search_4x4_depth_{}", depth), |b| {
            b.iter(|| search(black_box(&board), &config, &cancel))
        });
    }
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
