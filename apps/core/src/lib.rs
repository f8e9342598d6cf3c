//! Multi-panel orchestration for the pitwall race dashboard: one user
//! selection fans out to independent fetch-and-render pipelines, each with its
//! own loading indicator and its own failure placeholder.

pub mod api;
pub mod domain;
pub mod error;
pub mod generation;
pub mod indicator;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod render;
pub mod surface;

#[cfg(test)]
mod testing;

pub use api::{ApiRequest, ApiResponse, Backend, Endpoint, Method};
pub use domain::{Compound, ContainerId, IndicatorSize, PanelKind, Selection};
pub use error::{FailureKind, FetchError, SelectionError};
pub use indicator::{IndicatorGuard, IndicatorManager, IndicatorStats};
pub use orchestrator::{CapabilitySet, Orchestrator, RunReport, TrackSource};
pub use pipeline::{PanelOutcome, PipelineState};
pub use render::PanelView;
pub use surface::{MemorySurface, PanelHandle, Surface};
