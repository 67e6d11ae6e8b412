//! Process execution adapter
//!
//! Runs ffmpeg and ffprobe through `tokio::process`, waiting for exit and
//! capturing both output streams. Children get their own process group so a
//! terminal Ctrl-C reaches only sizeclip, which stops at the next pass boundary.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// `CREATE_NEW_PROCESS_GROUP`: the child ignores the console's Ctrl-C
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// `tokio::process` implementation of [`ProcessPort`]
#[derive(Debug, Clone, Default)]
pub struct TokioProcessAdapter;

impl TokioProcessAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessPort for TokioProcessAdapter {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, DomainError> {
        debug!("Running: {} {}", program.display(), args.join(" "));

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        #[cfg(windows)]
        command.creation_flags(CREATE_NEW_PROCESS_GROUP);

        let output = command
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DomainError::tool_unavailable(program.display().to_string()),
                _ => DomainError::ProcessFail(format!(
                    "Failed to run {}: {}",
                    program.display(),
                    e
                )),
            })?;

        // Killed by a signal: no exit code, report as failure
        let exit_code = output.status.code().unwrap_or(-1);
        debug!("{} exited with {}", program.display(), exit_code);

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
