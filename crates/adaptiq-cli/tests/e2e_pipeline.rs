//! End-to-end pipeline tests: pool parsing, engine and real stores together.
//!
//! These drive whole session lifecycles the way the CLI does, but in process
//! and with seeded randomness.

use std::path::Path;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use adaptiq_core::engine::{AdaptiveEngine, EngineConfig};
use adaptiq_core::error::SessionError;
use adaptiq_core::irt;
use adaptiq_core::model::QuestionPool;
use adaptiq_core::selector::QuestionTag;
use adaptiq_core::state::AdaptiveState;
use adaptiq_core::traits::StateStore;
use adaptiq_store::{JsonFileStore, MemoryStore};

fn example_pool() -> Arc<QuestionPool> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../pools/example.toml");
    Arc::new(adaptiq_core::parser::parse_pool(&path).unwrap())
}

fn engine_with(store: Arc<dyn StateStore>, seed: u64) -> AdaptiveEngine {
    AdaptiveEngine::new(store, example_pool(), EngineConfig::default())
        .with_rng(ChaCha8Rng::seed_from_u64(seed))
}

/// Run `sessions` sessions for a learner answering with Rasch probability.
fn simulate(engine: &AdaptiveEngine, learner: &str, ability: f64, sessions: u32, seed: u64) -> AdaptiveState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = engine.state(learner);
    for _ in 0..sessions {
        let mut plan = engine.start_session(learner);
        let answers: Vec<bool> = plan
            .id_map
            .values()
            .map(|id| rng.gen::<f64>() < irt::probability_correct(ability, engine.pool().initial_difficulty(id)))
            .collect();
        state = engine.submit_session(learner, &mut plan, &answers).unwrap();
    }
    state
}

#[test]
fn state_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = engine_with(Arc::new(JsonFileStore::new(dir.path())), 1);
    let after_two = simulate(&first, "ana", 0.5, 2, 10);
    drop(first);

    let second = engine_with(Arc::new(JsonFileStore::new(dir.path())), 2);
    let loaded = second.state("ana");
    assert_eq!(loaded.last_session_number, 2);
    assert_eq!(loaded.student.total_sessions, 2);
    assert_eq!(loaded.student.theta, after_two.student.theta);
    assert_eq!(loaded.questions.len(), after_two.questions.len());

    let plan = second.start_session("ana");
    assert_eq!(plan.session_number, 3);
}

#[test]
fn sessions_cover_pool_and_tag_history() {
    let engine = engine_with(Arc::new(MemoryStore::new()), 3);

    let first = engine.start_session("ana");
    assert!(first.tag_map.values().all(|t| *t == QuestionTag::New));

    let state = simulate(&engine, "ana", 0.0, 6, 4);
    assert_eq!(state.student.total_questions_answered, 6 * 9);
    assert!(state.student.theta_history.len() == 6);

    // With 12 regular questions and 8 drawn per session, later sessions
    // revisit questions and tag them from their history.
    let plan = engine.start_session("ana");
    let regular_tags: Vec<_> = plan
        .id_map
        .iter()
        .filter(|(_, id)| !id.is_bonus())
        .map(|(pos, _)| plan.tag_map[pos])
        .collect();
    assert!(regular_tags.iter().any(|t| *t != QuestionTag::New));

    for q in state.questions.values() {
        assert!(q.attempts.len() <= 10);
        assert!(q.consecutive_correct == 0 || q.consecutive_wrong == 0);
        assert!((-2.0..=2.0).contains(&q.difficulty));
    }
}

#[test]
fn ability_estimate_tracks_true_ability() {
    let strong = engine_with(Arc::new(MemoryStore::new()), 21);
    let weak = engine_with(Arc::new(MemoryStore::new()), 22);

    let strong_state = simulate(&strong, "strong", 2.0, 30, 5);
    let weak_state = simulate(&weak, "weak", -2.0, 30, 6);

    assert!(strong_state.student.theta > 0.5, "strong θ = {}", strong_state.student.theta);
    assert!(weak_state.student.theta < -0.5, "weak θ = {}", weak_state.student.theta);
    assert_eq!(strong_state.student.theta_history.len(), 20);
}

#[test]
fn corrupt_file_is_replaced_on_next_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    std::fs::create_dir_all(dir.path()).unwrap();
    std::fs::write(store.path_for("ana"), "\u{0}\u{0}not json").unwrap();

    let engine = engine_with(Arc::new(store.clone()), 7);
    assert_eq!(engine.state("ana"), AdaptiveState::new());

    let state = simulate(&engine, "ana", 0.0, 1, 8);
    assert_eq!(state.last_session_number, 1);
    assert_eq!(store.fetch("ana").unwrap().map(|s| s.last_session_number), Some(1));
}

#[test]
fn future_version_blob_is_discarded() {
    let store = Arc::new(MemoryStore::new());
    store.insert_raw("ana", r#"{"version": 2, "student": {"theta": 2.5}}"#);

    let engine = engine_with(store.clone(), 9);
    assert_eq!(engine.state("ana"), AdaptiveState::new());
    assert_eq!(engine.start_session("ana").session_number, 1);
}

#[test]
fn failing_store_does_not_break_sessions() {
    let store = Arc::new(MemoryStore::new());
    store.fail_writes(true);
    let engine = engine_with(store.clone(), 12);

    let mut plan = engine.start_session("ana");
    let answers = vec![true; plan.len()];
    let state = engine.submit_session("ana", &mut plan, &answers).unwrap();

    // The caller still gets the new state; the store just didn't keep it.
    assert_eq!(state.last_session_number, 1);
    assert_eq!(store.write_count(), 0);
    assert_eq!(engine.state("ana"), AdaptiveState::new());
}

#[test]
fn submitted_plan_cannot_be_replayed_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_with(Arc::new(MemoryStore::new()), 13);
    let plan_path = dir.path().join("plan.json");

    let mut plan = engine.start_session("ana");
    let answers = vec![false; plan.len()];
    engine.submit_session("ana", &mut plan, &answers).unwrap();
    plan.save_json(&plan_path).unwrap();

    let mut reloaded = adaptiq_core::session::SessionPlan::load_json(&plan_path).unwrap();
    let err = engine.submit_session("ana", &mut reloaded, &answers).unwrap_err();
    assert_eq!(err, SessionError::AlreadySubmitted(plan.id));
    assert_eq!(engine.state("ana").student.total_sessions, 1);
}

#[test]
fn read_failure_keeps_stored_history() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(store.clone(), 14);
    simulate(&engine, "ana", 2.0, 12, 15);
    let seasoned = engine.state("ana");
    let raw_before = store.raw("ana");
    assert_eq!(seasoned.student.total_sessions, 12);

    let mut plan = engine.start_session("ana");
    store.fail_reads(true);
    let answers = vec![true; plan.len()];
    let err = engine.submit_session("ana", &mut plan, &answers).unwrap_err();
    assert!(matches!(err, SessionError::StateUnavailable(_)));
    assert!(!plan.submitted);

    store.fail_reads(false);
    assert_eq!(store.raw("ana"), raw_before);
    assert_eq!(engine.state("ana"), seasoned);

    // Once the store reads again the same plan goes through.
    let state = engine.submit_session("ana", &mut plan, &answers).unwrap();
    assert_eq!(state.student.total_sessions, 13);
}

#[test]
fn progress_follows_submissions_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let engine = engine_with(Arc::new(store.clone()), 16);

    for correct in [4usize, 9, 2] {
        let mut plan = engine.start_session("ana");
        let answers: Vec<bool> = (0..plan.len()).map(|i| i < correct).collect();
        engine.submit_session("ana", &mut plan, &answers).unwrap();
    }

    let progress = store.load_progress("ana");
    assert_eq!(progress.best_score, Some(9));
    assert_eq!(progress.total_attempts, 3);

    engine.reset("ana");
    assert_eq!(engine.progress("ana").total_attempts, 0);
    assert!(!store.progress_path_for("ana").exists());
}
