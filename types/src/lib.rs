//! Shared plain data types for the upkeep workspace.
//!
//! Kept dependency-light so both the core engine and the CLI tools can use
//! them without pulling in the engine itself.

pub mod config;
pub mod tuning;

pub use config::{EngineConfig, LogLevel};
pub use tuning::Tuning;
