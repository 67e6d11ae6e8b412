//! Output size verification module

use serde::Serialize;

pub mod verifier;

pub use verifier::SizeVerifier;

/// How far a finished export landed from its size target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeVerdict {
    /// Bytes actually written
    pub actual_bytes: u64,
    /// Bytes requested
    pub target_bytes: u64,
    /// |actual - target| / max(target, 1)
    pub deviation_ratio: f64,
    /// Deviation at or under the configured tolerance
    pub within_tolerance: bool,
}

impl SizeVerdict {
    /// Signed percentage the output is above (+) or below (-) the target
    pub fn signed_percent(&self) -> f64 {
        let target = self.target_bytes.max(1) as f64;
        (self.actual_bytes as f64 - target) / target * 100.0
    }
}
