//! Command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{LocalFsAdapter, SizeClipConfig};
use crate::app::{ensure_source, AppContainer, DefaultAppContainer, ExportPreview, ExportRequest};
use crate::cli::args::{ClipArgs, ExportArgs, PlanArgs, ProbeArgs};
use crate::domain::model::*;
use crate::engine::{AbortSignal, NullObserver, PhaseObserver};
use crate::utils::format_file_size;
use crate::utils::time::{format_seconds, parse_time};

/// Prints export status lines to stderr
struct ConsoleObserver;

impl PhaseObserver for ConsoleObserver {
    fn on_phase(&self, phase: ExportPhase, message: &str) {
        match phase {
            ExportPhase::Pass1Running | ExportPhase::Pass2Running | ExportPhase::Validating => {
                eprintln!("{}...", message)
            }
            _ => {}
        }
    }
}

fn clip_request(clip: &ClipArgs) -> Result<ExportRequest> {
    let range = ClipRange::parse(&clip.start, clip.end.as_deref().unwrap_or(""))?;
    let mut request = ExportRequest::new(clip.input.clone(), range, clip.size_mb);
    if let Some(output) = &clip.output {
        request = request.with_destination(output.clone());
    }
    Ok(request)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize result")?
    );
    Ok(())
}

/// Execute the export command
pub async fn export(args: ExportArgs, config: &SizeClipConfig, json: bool) -> Result<()> {
    info!("Starting export of {}", args.clip.input.display());

    let request = clip_request(&args.clip)?;
    // Input errors win over a missing ffmpeg
    request.validate(&LocalFsAdapter::new()).await?;

    let observer: Arc<dyn PhaseObserver> = if json {
        Arc::new(NullObserver)
    } else {
        Arc::new(ConsoleObserver)
    };
    let container = DefaultAppContainer::new(config, observer)?;

    let abort = AbortSignal::new();
    let handle = abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current pass");
            handle.request();
        }
    });

    let outcome = container
        .export_interactor()
        .plan_and_export(&request, &abort)
        .await?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("{}", outcome.message);
        if let Some(warning) = &outcome.warning {
            eprintln!("Note: {}", warning);
        }
    }

    outcome
        .into_result()
        .map(|_| ())
        .context("Export failed")
}

/// Execute the plan command
pub async fn plan(args: PlanArgs, config: &SizeClipConfig, json: bool) -> Result<()> {
    let duration_seconds = args
        .duration
        .as_deref()
        .map(parse_time)
        .transpose()
        .context("Invalid --duration")?;
    let overrides = MediaProperties {
        duration_seconds,
        width: args.width,
        height: args.height,
        frame_rate: args.fps,
    };

    let mut request = clip_request(&args.clip)?.with_media_overrides(overrides);
    if args.no_probe {
        request = request.without_probe();
    }
    request.validate(&LocalFsAdapter::new()).await?;

    let container = if args.no_probe {
        DefaultAppContainer::offline(config)?
    } else {
        DefaultAppContainer::new(config, Arc::new(NullObserver))?
    };

    let interactor = container.export_interactor();
    let preview = interactor.preview(&request).await?;

    if json {
        print_json(&preview)
    } else {
        print!(
            "{}",
            render_preview(&preview, interactor.settings().mono_threshold_kbps)
        );
        Ok(())
    }
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs, config: &SizeClipConfig, json: bool) -> Result<()> {
    ensure_source(&LocalFsAdapter::new(), &args.input).await?;
    let container = DefaultAppContainer::new(config, Arc::new(NullObserver))?;
    let report = container.inspect_interactor().inspect(&args.input).await?;

    if json {
        print_json(&report)
    } else {
        print!("{}", report.summary());
        Ok(())
    }
}

/// Human-readable export plan
pub fn render_preview(preview: &ExportPreview, mono_threshold_kbps: u32) -> String {
    let media = &preview.media;
    let measured = match (media.width, media.height, media.frame_rate) {
        (Some(w), Some(h), Some(fps)) => format!("{}x{} @ {:.3} fps", w, h, fps),
        (Some(w), Some(h), None) => format!("{}x{}, frame rate unknown", w, h),
        _ => "resolution unknown".to_string(),
    };
    let mono = if preview.bitrates.audio_kbps <= mono_threshold_kbps {
        " (mono)"
    } else {
        ""
    };
    let scale = preview
        .scale
        .map(|s| format!("{}x{}", s.target_width, s.target_height))
        .unwrap_or_else(|| "none".to_string());

    let mut output = String::new();
    output.push_str(&format!("Source:    {}\n", preview.source.display()));
    output.push_str(&format!(
        "Range:     {} ({})\n",
        preview.range,
        format_seconds(preview.clip_seconds)
    ));
    output.push_str(&format!("Measured:  {}\n", measured));
    output.push_str(&format!(
        "Bitrates:  video {} kbps, audio {} kbps{}\n",
        preview.bitrates.video_kbps, preview.bitrates.audio_kbps, mono
    ));
    output.push_str(&format!("Scale:     {}\n", scale));
    output.push_str(&format!(
        "Target:    {} (payload estimate {})\n",
        format_file_size(preview.target_bytes),
        format_file_size(preview.estimated_bytes)
    ));
    output.push_str(&format!("Output:    {}\n", preview.destination.display()));
    output.push_str(&format!("Pass 1:    ffmpeg {}\n", preview.plan.pass1_args.join(" ")));
    output.push_str(&format!("Pass 2:    ffmpeg {}\n", preview.plan.pass2_args.join(" ")));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_preview() {
        let range = ClipRange::new(10.0, Some(70.0)).unwrap();
        let preview = ExportPreview {
            source: PathBuf::from("in.mp4"),
            range,
            clip_seconds: 60.0,
            media: MediaProperties {
                duration_seconds: Some(120.0),
                width: Some(1920),
                height: Some(1080),
                frame_rate: Some(30.0),
            },
            bitrates: BitratePlan {
                video_kbps: 300,
                audio_kbps: 48,
            },
            scale: Some(ScalePlan {
                target_width: 544,
                target_height: 306,
            }),
            target_bytes: 2_621_440,
            estimated_bytes: 2_610_000,
            destination: PathBuf::from("out.mp4"),
            plan: EncodePlan {
                pass1_args: vec!["-y".to_string()],
                pass2_args: vec!["-y".to_string(), "out.mp4".to_string()],
                log_path: PathBuf::from("out.mp4.passlog"),
                destination: PathBuf::from("out.mp4"),
            },
        };

        let text = render_preview(&preview, 64);
        assert!(text.contains("Range:     00:10.000 - 01:10.000 (01:00.000)"));
        assert!(text.contains("1920x1080 @ 30.000 fps"));
        assert!(text.contains("audio 48 kbps (mono)"));
        assert!(text.contains("Scale:     544x306"));
        assert!(text.contains("Target:    2.50 MB"));
        assert!(text.contains("Pass 2:    ffmpeg -y out.mp4"));
    }
}
