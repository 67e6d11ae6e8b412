//! Shared test doubles: a scripted ffmpeg/ffprobe stand-in

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use sizeclip::engine::AbortSignal;
use sizeclip::ports::{ProcessOutput, ProcessPort};
use sizeclip::DomainError;

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Call {
    pub fn is_probe(&self) -> bool {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().contains("ffprobe"))
            .unwrap_or(false)
    }

    pub fn value_of(&self, flag: &str) -> Option<&str> {
        let i = self.args.iter().position(|a| a == flag)?;
        self.args.get(i + 1).map(String::as_str)
    }

    pub fn pass(&self) -> Option<u8> {
        self.value_of("-pass").and_then(|p| p.parse().ok())
    }
}

/// Behaves like ffprobe/ffmpeg without running anything.
///
/// Pass 1 writes the statistics files x264 would leave behind; a successful
/// pass 2 writes `output_bytes` bytes to the destination.
pub struct FakeProcess {
    pub probe_stdout: Option<String>,
    pub pass1_exit: i32,
    pub pass2_exit: i32,
    pub output_bytes: Option<u64>,
    pub abort_after_pass1: Option<AbortSignal>,
    pub spawn_error: Option<DomainError>,
    /// Failing passes report on stdout and leave stderr empty
    pub stdout_only_failures: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl Default for FakeProcess {
    fn default() -> Self {
        Self {
            probe_stdout: None,
            pass1_exit: 0,
            pass2_exit: 0,
            output_bytes: None,
            abort_after_pass1: None,
            spawn_error: None,
            stdout_only_failures: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProcess {
    pub fn with_probe(json: &str) -> Self {
        Self {
            probe_stdout: Some(json.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn encoder_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !c.is_probe()).collect()
    }

    fn probe(&self) -> ProcessOutput {
        match &self.probe_stdout {
            Some(stdout) => ProcessOutput {
                exit_code: 0,
                stdout: stdout.clone(),
                stderr: String::new(),
            },
            None => ProcessOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: "Invalid data found when processing input".to_string(),
            },
        }
    }

    fn encode(&self, call: &Call) -> ProcessOutput {
        let pass = call.pass().unwrap_or(0);
        let exit_code = if pass == 1 { self.pass1_exit } else { self.pass2_exit };

        if pass == 1 {
            if let Some(log) = call.value_of("-passlogfile") {
                std::fs::write(log, b"#options").unwrap();
                std::fs::write(format!("{}.mbtree", log), b"tree").unwrap();
            }
            if let Some(abort) = &self.abort_after_pass1 {
                abort.request();
            }
        }
        if pass == 2 && exit_code == 0 {
            if let (Some(bytes), Some(dest)) = (self.output_bytes, call.args.last()) {
                std::fs::write(dest, vec![0u8; bytes as usize]).unwrap();
            }
        }

        let report = if exit_code == 0 {
            "frame=  100 fps=50".to_string()
        } else {
            format!("ffmpeg banner\nError while encoding pass {}", pass)
        };
        if self.stdout_only_failures && exit_code != 0 {
            ProcessOutput {
                exit_code,
                stdout: report,
                stderr: String::new(),
            }
        } else {
            ProcessOutput {
                exit_code,
                stdout: String::new(),
                stderr: report,
            }
        }
    }
}

#[async_trait]
impl ProcessPort for FakeProcess {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput, DomainError> {
        let call = Call {
            program: program.to_path_buf(),
            args: args.to_vec(),
        };
        self.calls.lock().unwrap().push(call.clone());

        if let Some(error) = &self.spawn_error {
            return Err(error.clone());
        }
        if call.is_probe() {
            Ok(self.probe())
        } else {
            Ok(self.encode(&call))
        }
    }
}

/// ffprobe JSON for a 1920x1080 30 fps source of `duration` seconds
pub fn probe_json(duration: f64) -> String {
    format!(
        r#"{{"programs": [], "streams": [{{"width": 1920, "height": 1080, "avg_frame_rate": "30/1"}}], "format": {{"duration": "{:.6}"}}}}"#,
        duration
    )
}
