// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod extract;
pub mod format;
pub mod history;
pub mod ingest;
pub mod pipeline;
pub mod publish;

pub use crate::ingest::types::{Deal, DealSource};
pub use crate::pipeline::{run, run_once, RunOptions, RunOutcome};
pub use crate::publish::{Poster, PostMode};
