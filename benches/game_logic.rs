use criterion::{black_box, criterion_group, criterion_main, Criterion};
use match3::core::{Board, EngineConfig, GameState, MatchDetector, SimpleRng};

fn bench_initialize(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut rng = SimpleRng::new(12345);

    c.bench_function("initialize_8x8", |b| {
        b.iter(|| Board::initialize(black_box(&config), &mut rng))
    });
}

fn bench_detect_all(c: &mut Criterion) {
    let board = Board::parse(
        "RRRGBYPC\n\
         GBYPCRGB\n\
         GBYPCRGB\n\
         GYYYCRGB\n\
         BPCRGBYP\n\
         PCRGBYPR\n\
         CRGBYPRG\n\
         RGBYPRGB",
    )
    .unwrap_or_else(|_| Board::empty(8, 8));
    let detector = MatchDetector::default();

    c.bench_function("detect_all_8x8", |b| {
        b.iter(|| detector.detect_all(black_box(&board)))
    });
}

fn bench_stuck_check(c: &mut Criterion) {
    let state = GameState::new(EngineConfig::default(), 12345).unwrap();
    let detector = MatchDetector::default();

    c.bench_function("has_any_possible_move", |b| {
        b.iter(|| black_box(state.board()).has_any_possible_move(&detector))
    });
}

fn bench_full_turn(c: &mut Criterion) {
    let mut state = GameState::new(EngineConfig::default(), 12345).unwrap();

    c.bench_function("hint_swap_settle", |b| {
        b.iter(|| {
            if state.game_over() {
                let next = state.seed().wrapping_add(1);
                state.reset(next).unwrap();
            }
            if let Some((a, bb)) = state.get_hint() {
                state.handle_swap(a, bb).unwrap();
                state.settle().unwrap();
            }
        })
    });
}

criterion_group!(
    benches,
    bench_initialize,
    bench_detect_all,
    bench_stuck_check,
    bench_full_turn
);
criterion_main!(benches);
