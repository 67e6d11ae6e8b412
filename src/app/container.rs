use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{
    FfprobeAdapter, LocalFsAdapter, SizeClipConfig, TokioProcessAdapter, ToolLocator, ToolPaths,
};
use crate::app::{export_interactor::ExportInteractor, inspect_interactor::InspectInteractor};
use crate::domain::errors::DomainError;
use crate::engine::{EncodeOrchestrator, NullObserver, PhaseObserver};
use crate::output::SizeVerifier;
use crate::ports::{FsPort, ProbePort, ProcessPort};
use crate::utils::path::default_output_dir;

pub trait AppContainer: Send + Sync {
    fn export_interactor(&self) -> Arc<ExportInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    tools: ToolPaths,
    export_interactor: Arc<ExportInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Locate ffmpeg/ffprobe per `config` and wire the real adapters
    pub fn new(
        config: &SizeClipConfig,
        observer: Arc<dyn PhaseObserver>,
    ) -> Result<Self, DomainError> {
        let tools = ToolLocator::new()
            .with_overrides(config.tools.ffmpeg.clone(), config.tools.ffprobe.clone())
            .locate()?;
        Self::with_process(config, tools, Arc::new(TokioProcessAdapter::new()), observer)
    }

    /// Container for planning without any external tool; nothing it builds may spawn ffmpeg
    pub fn offline(config: &SizeClipConfig) -> Result<Self, DomainError> {
        let tools = ToolPaths {
            ffmpeg: PathBuf::from(crate::adapters::tool_locator::FFMPEG),
            ffprobe: PathBuf::from(crate::adapters::tool_locator::FFPROBE),
        };
        Self::with_process(
            config,
            tools,
            Arc::new(TokioProcessAdapter::new()),
            Arc::new(NullObserver),
        )
    }

    /// Wire everything around an injected process port
    pub fn with_process(
        config: &SizeClipConfig,
        tools: ToolPaths,
        process_port: Arc<dyn ProcessPort>,
        observer: Arc<dyn PhaseObserver>,
    ) -> Result<Self, DomainError> {
        config.planner.validate()?;

        let fs_port: Arc<dyn FsPort> = Arc::new(LocalFsAdapter::new());
        let probe_port: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(
            tools.ffprobe.clone(),
            Arc::clone(&process_port),
        ));

        let orchestrator = Arc::new(
            EncodeOrchestrator::new(
                tools.ffmpeg.clone(),
                Arc::clone(&process_port),
                Arc::clone(&fs_port),
                SizeVerifier::new(config.planner.size_tolerance),
            )
            .with_observer(observer),
        );

        let output_dir = config
            .output
            .directory
            .clone()
            .unwrap_or_else(default_output_dir);

        let export_interactor = Arc::new(ExportInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&fs_port),
            orchestrator,
            config.planner.clone(),
            output_dir,
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&fs_port),
        ));

        Ok(Self {
            tools,
            export_interactor,
            inspect_interactor,
        })
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }
}

impl AppContainer for DefaultAppContainer {
    fn export_interactor(&self) -> Arc<ExportInteractor> {
        Arc::clone(&self.export_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
