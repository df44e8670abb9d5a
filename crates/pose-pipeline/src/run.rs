//! Extraction run generations.
//!
//! Each extraction run holds a [`RunToken`] carrying the generation it was
//! started under. Starting another run or cancelling bumps the shared
//! counter; the old token then fails [`RunToken::ensure_current`] at the
//! next resume point and the run stops without issuing further work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crete_common::error::{CreteError, CreteResult};

/// Source of run generations for one analysis view.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    current: Arc<AtomicU64>,
}

/// Handle identifying one extraction run.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, superseding any previous one.
    pub fn begin(&self) -> RunToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "Extraction run started");
        self.token(generation)
    }

    /// Start a run under a generation assigned elsewhere (e.g. by the
    /// view state reducer).
    pub fn adopt(&self, generation: u64) -> RunToken {
        self.current.store(generation, Ordering::SeqCst);
        tracing::debug!(generation, "Extraction run adopted");
        self.token(generation)
    }

    /// Invalidate the current run without starting a new one.
    pub fn cancel(&self) {
        let previous = self.current.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(generation = previous, "Extraction run cancelled");
    }

    /// The generation currently considered live.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    fn token(&self, generation: u64) -> RunToken {
        RunToken {
            generation,
            current: self.current.clone(),
        }
    }
}

impl RunToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this run is still the live one.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Fail with [`CreteError::Cancelled`] if the run was superseded.
    pub fn ensure_current(&self) -> CreteResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(CreteError::Cancelled {
                generation: self.generation,
            })
        }
    }
}
