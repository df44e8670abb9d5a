//! Crete Common Utilities
//!
//! Shared infrastructure for all Crete crates:
//! - Error types and result aliases
//! - Playback clock abstraction used by the trace player
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
