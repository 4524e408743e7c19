//! Agent Benchmarks
//!
//! Performance benchmarks for the per-ply hot path using Criterion.

use chess_agent::encoder::encode;
use chess_agent::policy::select;
use chess_agent::reward::reward;
use chess_agent::{ActionId, QLearner, QTable, RulesEngine, StandardChess};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_encode_starting(c: &mut Criterion) {
    let rules = StandardChess;
    let pos = rules.initial_position();

    c.bench_function("encode_starting_position", |b| {
        b.iter(|| black_box(encode(&rules, &pos)))
    });
}

fn bench_reward_starting(c: &mut Criterion) {
    let rules = StandardChess;
    let pos = rules.initial_position();

    c.bench_function("reward_starting_position", |b| {
        b.iter(|| black_box(reward(&rules, &pos)))
    });
}

fn bench_greedy_select(c: &mut Criterion) {
    let rules = StandardChess;
    let pos = rules.initial_position();
    let state = encode(&rules, &pos);
    let mut table = QTable::new();
    table.set(&state, &ActionId::new("e2e4"), 1.0);
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("greedy_select_starting", |b| {
        b.iter(|| black_box(select(&rules, &table, &pos, 0.0, &mut rng)))
    });
}

fn bench_learner_update(c: &mut Criterion) {
    let rules = StandardChess;
    let learner = QLearner::new(0.1, 0.9);
    let table = RwLock::new(QTable::new());
    let pos = rules.initial_position();
    let state = encode(&rules, &pos);
    let action = ActionId::new("e2e4");
    let next = match rules.parse_move(&pos, "e2e4") {
        Some(mv) => rules.apply(&pos, &mv),
        None => return,
    };

    c.bench_function("learner_update", |b| {
        b.iter(|| black_box(learner.update(&rules, &table, &state, &action, 0.0, &next)))
    });
}

criterion_group!(
    benches,
    bench_encode_starting,
    bench_reward_starting,
    bench_greedy_select,
    bench_learner_update,
);
criterion_main!(benches);
