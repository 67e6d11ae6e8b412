//! Output size verification implementation

use tracing::{info, warn};

use crate::domain::model::BYTES_PER_MEGABYTE;
use crate::output::SizeVerdict;
use crate::utils::format_file_size;

/// Compares the written file against the requested size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeVerifier {
    tolerance: f64,
}

impl SizeVerifier {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Byte count of a target given in megabytes (MiB)
    pub fn target_bytes(target_size_mb: f64) -> u64 {
        (target_size_mb * BYTES_PER_MEGABYTE) as u64
    }

    /// Deviation verdict; a miss beyond tolerance is advisory only
    pub fn verify(&self, actual_bytes: u64, target_bytes: u64) -> SizeVerdict {
        let deviation_ratio =
            (actual_bytes as f64 - target_bytes as f64).abs() / target_bytes.max(1) as f64;
        let verdict = SizeVerdict {
            actual_bytes,
            target_bytes,
            deviation_ratio,
            within_tolerance: deviation_ratio <= self.tolerance,
        };

        if verdict.within_tolerance {
            info!(
                "Output size {} is within {:.1}% of target",
                format_file_size(actual_bytes),
                deviation_ratio * 100.0
            );
        } else {
            warn!(
                "Output size {} deviates {:+.1}% from target {}",
                format_file_size(actual_bytes),
                verdict.signed_percent(),
                format_file_size(target_bytes)
            );
        }
        verdict
    }

    /// User-facing advisory for an out-of-tolerance verdict
    pub fn warning_message(&self, verdict: &SizeVerdict) -> Option<String> {
        if verdict.within_tolerance {
            return None;
        }
        Some(format!(
            "Output is {} ({:+.1}% vs target {}), beyond the {:.0}% tolerance. \
             Very short or complex clips often miss; try a different target size.",
            format_file_size(verdict.actual_bytes),
            verdict.signed_percent(),
            format_file_size(verdict.target_bytes),
            self.tolerance * 100.0
        ))
    }
}
