use serde::Serialize;
use thiserror::Error;

use crate::domain::ContainerId;
use crate::pipeline::{PipelineEvent, PipelineState};

/// Why a single pipeline run failed. Always caught by the pipeline that saw
/// it; never crosses into another panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("server answered with HTTP status {status}")]
    Http { status: u16 },
    #[error("server reported an error: {0}")]
    Application(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl FetchError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::NetworkFailure,
            Self::Http { .. } => FailureKind::HttpError,
            Self::Application(_) => FailureKind::ApplicationError,
            Self::Decode(_) => FailureKind::DecodeError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NetworkFailure,
    HttpError,
    ApplicationError,
    DecodeError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no year selected")]
    EmptyYear,
    #[error("event `{event}` is not on the {year} calendar")]
    UnknownEvent { year: String, event: String },
    #[error("the {year} calendar is still loading")]
    CalendarPending { year: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown panel `{0}` (expected tyre_strategy, pitstops, track_stats, track_info or replay)")]
pub struct CapabilityParseError(pub String);

/// Two panels asked to write into the same container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("container #{} is already owned by another panel", .0.dom_id())]
pub struct HandleConflict(pub ContainerId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid transition from {from} with event {event}")]
pub struct TransitionError {
    pub from: PipelineState,
    pub event: PipelineEvent,
}
