use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use adaptiq_core::irt::{update_ability, ItemResponse};
use adaptiq_core::model::{QuestionItem, QuestionKind, QuestionPool};
use adaptiq_core::selector::{
    score_candidates, select_session, weighted_sample_without_replacement, SelectionWeights,
};
use adaptiq_core::session::{record_session_results, SessionResult};
use adaptiq_core::state::AdaptiveState;

fn make_pool(n: usize) -> QuestionPool {
    let kinds = [
        QuestionKind::TrueFalse,
        QuestionKind::FillBlank,
        QuestionKind::MultipleChoice,
        QuestionKind::Arrangement,
        QuestionKind::StatementAb,
    ];
    let item = |i: usize| QuestionItem {
        kind: kinds[i % kinds.len()],
        text: format!("Question {i}"),
        needs_calculator: false,
        explanation: None,
        payload: serde_json::Value::Null,
    };
    QuestionPool {
        id: "bench".into(),
        name: "Benchmark".into(),
        description: String::new(),
        questions: (0..n).map(item).collect(),
        bonus: (0..10).map(item).collect(),
    }
}

/// A state where roughly half the pool has history.
fn warm_state(pool: &QuestionPool) -> AdaptiveState {
    let mut state = AdaptiveState::new();
    let now = chrono::Utc::now();
    for session in 0..10 {
        let results: Vec<SessionResult> = (0..pool.size() / 2)
            .filter(|i| i % 10 == session)
            .map(|i| SessionResult::new(pool.regular_id(i), i % 3 != 0))
            .collect();
        state = record_session_results(&state, pool, &results, now);
    }
    state
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let weights = SelectionWeights::default();

    for n in [50, 500] {
        let pool = make_pool(n);
        let state = warm_state(&pool);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        group.bench_function(format!("score_candidates_{n}"), |b| {
            b.iter(|| score_candidates(black_box(&pool), black_box(&state), &weights, &mut rng))
        });

        group.bench_function(format!("select_session_{n}"), |b| {
            b.iter(|| select_session(black_box(&pool), black_box(&state), 8, &weights, &mut rng))
        });
    }

    let weights_1k: Vec<f64> = (0..1000).map(|i| 0.1 + (i % 17) as f64 / 17.0).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    group.bench_function("weighted_sample_8_of_1000", |b| {
        b.iter(|| weighted_sample_without_replacement(black_box(&weights_1k), 8, &mut rng))
    });

    group.finish();
}

fn bench_ability_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("ability_update");

    let responses: Vec<ItemResponse> = (0..9)
        .map(|i| ItemResponse {
            difficulty: -1.0 + i as f64 * 0.25,
            correct: i % 2 == 0,
        })
        .collect();

    group.bench_function("9_responses", |b| {
        b.iter(|| update_ability(black_box(0.3), black_box(&responses)))
    });

    let pool = make_pool(100);
    let state = warm_state(&pool);
    let results: Vec<SessionResult> = (0..9)
        .map(|i| SessionResult::new(pool.regular_id(i * 7), i % 2 == 0))
        .collect();
    let now = chrono::Utc::now();
    group.bench_function("record_session_results", |b| {
        b.iter(|| record_session_results(black_box(&state), &pool, black_box(&results), now))
    });

    group.finish();
}

criterion_group!(benches, bench_selection, bench_ability_update);
criterion_main!(benches);
