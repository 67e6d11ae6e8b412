// Application layer - Use case interactors

pub mod container;
pub mod export_interactor;
pub mod inspect_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use export_interactor::{ensure_source, ExportInteractor, ExportPreview, ExportRequest};
pub use inspect_interactor::{InspectInteractor, InspectReport};
