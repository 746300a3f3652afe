//! adaptiq-core: Adaptive question selection for quiz sessions.
//!
//! This crate holds the question data model, the Rasch ability/difficulty
//! estimator, the spaced-repetition scheduler, the persisted per-learner
//! state, and the session selector that combines them. Persistence backends
//! live in `adaptiq-store`.

pub mod engine;
pub mod error;
pub mod irt;
pub mod mastery;
pub mod metadata;
pub mod model;
pub mod parser;
pub mod progress;
pub mod report;
pub mod selector;
pub mod session;
pub mod srs;
pub mod state;
pub mod traits;
