//! Identity resolution engine
//!
//! Resolves a probe embedding to an enrolled identity by
//! nearest-neighbor search under a distance threshold.

pub mod engine;

pub use engine::{MatchEngine, Resolution, DEFAULT_THRESHOLD};
