//! adaptiq-store: Learner state persistence and configuration.
//!
//! Implements the `StateStore` trait for a JSON-file directory and an
//! in-memory map, and loads the `adaptiq.toml` configuration.

pub mod config;
pub mod file;
pub mod memory;

pub use config::{load_config, load_config_from, AdaptiqConfig};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
