//! Two-pass encode state machine
//!
//! `Idle -> Pass1Running -> Pass2Running -> Validating -> Succeeded | Failed`.
//! Passes are strictly sequential, nothing is retried, and the statistics log
//! family is removed after pass 2 whatever its outcome.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::{NullObserver, PhaseObserver};
use crate::engine::AbortSignal;
use crate::output::SizeVerifier;
use crate::ports::*;
use crate::utils::format_file_size;

/// Lines of ffmpeg output carried in a failure message
const STDERR_TAIL_LINES: usize = 20;

/// Runs both passes of an [`EncodePlan`] and reports an [`ExportOutcome`]
pub struct EncodeOrchestrator {
    ffmpeg: PathBuf,
    process: Arc<dyn ProcessPort>,
    fs: Arc<dyn FsPort>,
    verifier: SizeVerifier,
    observer: Arc<dyn PhaseObserver>,
}

impl EncodeOrchestrator {
    pub fn new(
        ffmpeg: impl Into<PathBuf>,
        process: Arc<dyn ProcessPort>,
        fs: Arc<dyn FsPort>,
        verifier: SizeVerifier,
    ) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            process,
            fs,
            verifier,
            observer: Arc::new(NullObserver),
        }
    }

    /// Report phase transitions to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Execute `plan` aiming at `target_bytes`.
    ///
    /// A pass exiting non-zero, an abort and a missing output all come back as
    /// `Ok` with `succeeded == false`. `Err` means a process could not be run at
    /// all or the output could not be inspected.
    pub async fn run(
        &self,
        plan: &EncodePlan,
        target_bytes: u64,
        abort: &AbortSignal,
    ) -> Result<ExportOutcome, DomainError> {
        let run = RunContext {
            plan,
            target_bytes,
            started: Instant::now(),
        };

        self.enter(ExportPhase::Idle, "Preparing two-pass encode");
        self.enter(ExportPhase::Pass1Running, "Pass 1/2: analyzing");
        let pass1 = match self.process.run(&self.ffmpeg, &plan.pass1_args).await {
            Ok(output) => output,
            Err(e) => {
                self.cleanup(plan).await;
                return Err(e);
            }
        };
        if !pass1.success() {
            self.cleanup(plan).await;
            return Ok(self.fail_pass(&run, 1, &pass1));
        }

        if abort.is_requested() {
            info!("Abort requested after pass 1, skipping pass 2");
            self.cleanup(plan).await;
            self.enter(ExportPhase::Failed, ABORTED_MESSAGE);
            let mut outcome = run.outcome(ExportPhase::Failed, 0, ABORTED_MESSAGE.to_string());
            outcome.aborted = true;
            return Ok(outcome);
        }

        self.enter(ExportPhase::Pass2Running, "Pass 2/2: encoding");
        let pass2 = self.process.run(&self.ffmpeg, &plan.pass2_args).await;
        self.cleanup(plan).await;
        let pass2 = pass2?;
        if !pass2.success() {
            return Ok(self.fail_pass(&run, 2, &pass2));
        }

        self.enter(ExportPhase::Validating, "Checking output size");
        if !self.fs.file_exists(&plan.destination).await? {
            let message = format!(
                "ffmpeg reported success but {} was not written",
                plan.destination.display()
            );
            self.enter(ExportPhase::Failed, &message);
            let mut outcome = run.outcome(ExportPhase::Failed, 0, message);
            outcome.failed_pass = Some(2);
            return Ok(outcome);
        }

        let actual_bytes = self.fs.file_size(&plan.destination).await?;
        let verdict = self.verifier.verify(actual_bytes, target_bytes);
        let message = format!(
            "Exported {} ({})",
            plan.destination.display(),
            format_file_size(actual_bytes)
        );
        self.enter(ExportPhase::Succeeded, &message);

        let mut outcome = run.outcome(ExportPhase::Succeeded, actual_bytes, message);
        outcome.deviation_ratio = verdict.deviation_ratio;
        outcome.warning = self.verifier.warning_message(&verdict);
        Ok(outcome)
    }

    fn enter(&self, phase: ExportPhase, message: &str) {
        info!(%phase, "{}", message);
        self.observer.on_phase(phase, message);
    }

    fn fail_pass(&self, run: &RunContext<'_>, pass: u8, output: &ProcessOutput) -> ExportOutcome {
        debug!("ffmpeg pass {} stderr:\n{}", pass, output.stderr);
        let tail = output.diagnostic_tail(STDERR_TAIL_LINES);
        let message = if tail.is_empty() {
            format!("exit code {}", output.exit_code)
        } else {
            format!("exit code {}: {}", output.exit_code, tail)
        };
        self.enter(ExportPhase::Failed, &format!("Pass {} failed", pass));

        let mut outcome = run.outcome(ExportPhase::Failed, 0, message);
        outcome.failed_pass = Some(pass);
        outcome
    }

    /// Remove every statistics artifact of `plan`; failures are only logged
    async fn cleanup(&self, plan: &EncodePlan) {
        let mut removed = 0;
        for artifact in plan.stats_artifacts() {
            match self.fs.remove_file_if_exists(&artifact).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => warn!("Could not remove {}: {}", artifact.display(), e),
            }
        }
        debug!("Removed {} statistics artifacts", removed);
    }
}

/// Per-run values shared by every outcome
struct RunContext<'a> {
    plan: &'a EncodePlan,
    target_bytes: u64,
    started: Instant,
}

impl RunContext<'_> {
    fn outcome(&self, phase: ExportPhase, output_size_bytes: u64, message: String) -> ExportOutcome {
        ExportOutcome {
            succeeded: phase == ExportPhase::Succeeded,
            phase,
            output_path: self.plan.destination.clone(),
            output_size_bytes,
            target_bytes: self.target_bytes,
            deviation_ratio: 1.0,
            message,
            warning: None,
            failed_pass: None,
            aborted: false,
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
            completed_at: Local::now(),
        }
    }
}
