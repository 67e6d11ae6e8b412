// Export interactor - Orchestrates the size-targeted export use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{AbortSignal, EncodeOrchestrator};
use crate::output::SizeVerifier;
use crate::planner::EncodePlanBuilder;
use crate::ports::*;
use crate::utils::path::export_file_name;

/// What the caller wants exported
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub source: PathBuf,
    pub range: ClipRange,
    pub target_size_mb: f64,
    /// Explicit output file; derived from the source and parameters when absent
    pub destination: Option<PathBuf>,
    /// Measurements that take precedence over the probe
    pub media_overrides: MediaProperties,
    /// Plan from `media_overrides` alone, without touching the source
    pub skip_probe: bool,
}

impl ExportRequest {
    pub fn new(source: impl Into<PathBuf>, range: ClipRange, target_size_mb: f64) -> Self {
        Self {
            source: source.into(),
            range,
            target_size_mb,
            destination: None,
            media_overrides: MediaProperties::default(),
            skip_probe: false,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_media_overrides(mut self, overrides: MediaProperties) -> Self {
        self.media_overrides = overrides;
        self
    }

    pub fn without_probe(mut self) -> Self {
        self.skip_probe = true;
        self
    }

    /// Input checks that need no external tool: a positive size and, unless
    /// planning offline, an existing source file
    pub async fn validate(&self, fs: &dyn FsPort) -> Result<(), DomainError> {
        if !(self.target_size_mb > 0.0 && self.target_size_mb.is_finite()) {
            return Err(DomainError::InvalidTargetSize(self.target_size_mb));
        }
        if !self.skip_probe {
            ensure_source(fs, &self.source).await?;
        }
        Ok(())
    }
}

/// `SourceNotFound` unless `source` is an existing regular file
pub async fn ensure_source(fs: &dyn FsPort, source: &Path) -> Result<(), DomainError> {
    if fs.file_exists(source).await? {
        Ok(())
    } else {
        Err(DomainError::SourceNotFound(source.display().to_string()))
    }
}

/// Everything decided for an export before any encoder runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPreview {
    pub source: PathBuf,
    /// Range with its end resolved from the probe when it was left open
    pub range: ClipRange,
    pub clip_seconds: f64,
    pub media: MediaProperties,
    pub bitrates: BitratePlan,
    pub scale: Option<ScalePlan>,
    pub target_bytes: u64,
    /// Payload the bitrates produce, before container overhead
    pub estimated_bytes: u64,
    pub destination: PathBuf,
    pub plan: EncodePlan,
}

/// Interactor for the export use case
pub struct ExportInteractor {
    probe_port: Arc<dyn ProbePort>,
    fs_port: Arc<dyn FsPort>,
    orchestrator: Arc<EncodeOrchestrator>,
    settings: PlannerSettings,
    output_dir: PathBuf,
}

impl ExportInteractor {
    /// Create new export interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        fs_port: Arc<dyn FsPort>,
        orchestrator: Arc<EncodeOrchestrator>,
        settings: PlannerSettings,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            probe_port,
            fs_port,
            orchestrator,
            settings,
            output_dir,
        }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Measure a source file; missing fields are absent, a missing file is an error
    pub async fn probe(&self, source: &Path) -> Result<MediaProperties, DomainError> {
        ensure_source(self.fs_port.as_ref(), source).await?;
        let media = self.probe_port.probe(source).await;
        if media.is_empty() {
            info!("Nothing could be probed from {}", source.display());
        }
        Ok(media)
    }

    /// Bitrates for a clip length and target size under the configured bounds
    pub fn allocate(&self, clip_seconds: f64, target_size_mb: f64) -> Result<BitratePlan, DomainError> {
        BitrateAllocator::from_settings(&self.settings).allocate(clip_seconds, target_size_mb)
    }

    /// Downscale decision for a measured source at `video_kbps`
    pub fn advise(&self, media: &MediaProperties, video_kbps: u32) -> Option<ScalePlan> {
        DownscaleAdvisor::from_settings(&self.settings).advise(
            media.width,
            media.height,
            media.frame_rate,
            video_kbps,
        )
    }

    /// Both pass argument vectors for already-decided parameters
    pub fn build_plan(
        &self,
        source: &Path,
        destination: &Path,
        range: &ClipRange,
        bitrates: &BitratePlan,
        scale: Option<&ScalePlan>,
    ) -> EncodePlan {
        EncodePlanBuilder::from_settings(&self.settings).build(source, destination, range, bitrates, scale)
    }

    /// Plan an export without running the encoder.
    ///
    /// Input errors surface here, before any encoder process exists.
    pub async fn preview(&self, request: &ExportRequest) -> Result<ExportPreview, DomainError> {
        request.validate(self.fs_port.as_ref()).await?;

        let media = if request.skip_probe {
            request.media_overrides
        } else {
            request.media_overrides.or(self.probe(&request.source).await?)
        };

        let range = request.range.resolve_end(media.duration_seconds)?;
        let clip_seconds = range.duration_seconds().ok_or_else(|| {
            DomainError::InvalidRange("Could not determine video duration".to_string())
        })?;

        let bitrates = self.allocate(clip_seconds, request.target_size_mb)?;
        let scale = self.advise(&media, bitrates.video_kbps);

        let destination = match &request.destination {
            Some(destination) => destination.clone(),
            None => self
                .output_dir
                .join(export_file_name(&request.source, &range, request.target_size_mb)?),
        };
        if destination == request.source {
            return Err(DomainError::BadArgs(format!(
                "Output would overwrite the source: {}",
                destination.display()
            )));
        }

        let plan = self.build_plan(&request.source, &destination, &range, &bitrates, scale.as_ref());

        info!(
            "Planned {} of {}: video {} kbps, audio {} kbps{}",
            range,
            request.source.display(),
            bitrates.video_kbps,
            bitrates.audio_kbps,
            scale
                .map(|s| format!(", scaled to {}x{}", s.target_width, s.target_height))
                .unwrap_or_default()
        );

        Ok(ExportPreview {
            source: request.source.clone(),
            range,
            clip_seconds,
            media,
            bitrates,
            scale,
            target_bytes: SizeVerifier::target_bytes(request.target_size_mb),
            estimated_bytes: bitrates.estimated_bytes(clip_seconds),
            destination,
            plan,
        })
    }

    /// Plan, run both passes, and report how close the output came to the target
    pub async fn plan_and_export(
        &self,
        request: &ExportRequest,
        abort: &AbortSignal,
    ) -> Result<ExportOutcome, DomainError> {
        let preview = self.preview(request).await?;

        if let Some(dir) = preview.destination.parent() {
            if !dir.as_os_str().is_empty() {
                self.fs_port.create_directory(dir).await?;
            }
        }

        self.orchestrator
            .run(&preview.plan, preview.target_bytes, abort)
            .await
    }
}
