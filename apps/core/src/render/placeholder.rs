use serde::Serialize;

use crate::domain::PanelKind;

pub const RETRY_HINT: &str = "Try selecting another race";

/// Inline failure message shown inside the affected panel. Carries no
/// diagnostic detail; the raw error only goes to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPlaceholder {
    pub title: String,
    pub message: String,
    pub hint: &'static str,
}

impl ErrorPlaceholder {
    pub fn for_panel(kind: PanelKind) -> Self {
        Self {
            title: title_for(kind).to_string(),
            message: format!("Could not load {}", kind.label()),
            hint: RETRY_HINT,
        }
    }
}

/// A non-failure message, e.g. a panel with nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

const fn title_for(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Results => "Race Results",
        PanelKind::Positions => "Position Chart",
        PanelKind::TrackStats | PanelKind::TrackInfo => "Circuit",
        PanelKind::TyreStrategy => "Tyre Strategy",
        PanelKind::Pitstops => "Pit Stop Analysis",
        PanelKind::Replay => "Replay",
    }
}
