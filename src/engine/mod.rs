//! Two-pass encode engine
//!
//! Runs an [`EncodePlan`](crate::domain::model::EncodePlan) through the process
//! port, cleans up statistics artifacts and validates the output size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod orchestrator;
pub mod progress;

pub use crate::domain::model::ExportPhase;
pub use orchestrator::EncodeOrchestrator;
pub use progress::{NullObserver, PhaseObserver};

/// Request to stop an export at the next pass boundary.
///
/// A running pass is never interrupted: killing pass 1 mid-write corrupts the
/// statistics pass 2 depends on.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    requested: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
