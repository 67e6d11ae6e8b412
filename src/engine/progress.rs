//! Phase notifications for callers that display export status

use crate::domain::model::ExportPhase;

/// Receives every phase transition of an export
pub trait PhaseObserver: Send + Sync {
    /// Called on entering `phase`; `message` is a short human status line
    fn on_phase(&self, phase: ExportPhase, message: &str);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PhaseObserver for NullObserver {
    fn on_phase(&self, _phase: ExportPhase, _message: &str) {}
}
