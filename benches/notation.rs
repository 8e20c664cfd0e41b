//! 记谱解析与棋盘加载基准测试

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quantum_xiangqi::{load_board_description, Move, INITIAL_FEN};

fn bench_notation(c: &mut Criterion) {
    let inputs = ["a1a2", "b1^a3c3", "a3b1^c3", "b1^a3c3.m1:SPLIT_JUMP:BASIC"];

    c.bench_function("parse_move", |b| {
        b.iter(|| {
            for s in inputs {
                black_box(Move::from_notation(black_box(s)));
            }
        })
    });

    let moves: Vec<Move> = inputs
        .iter()
        .filter_map(|s| Move::from_notation(s).ok())
        .collect();
    c.bench_function("move_to_notation", |b| {
        b.iter(|| {
            for mv in &moves {
                black_box(mv.to_notation(true));
            }
        })
    });
}

fn bench_board_loading(c: &mut Criterion) {
    let board = INITIAL_FEN.split(' ').next().unwrap_or(INITIAL_FEN);
    c.bench_function("load_board_description", |b| {
        b.iter(|| load_board_description(black_box(board)))
    });
}

criterion_group!(benches, bench_notation, bench_board_loading);
criterion_main!(benches);
