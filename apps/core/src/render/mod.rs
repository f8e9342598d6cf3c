//! Panel renderers: pure functions from one payload to one view.
//!
//! Renderers never touch the network or a container. They build view models
//! that a [`Surface`](crate::surface::Surface) draws, either natively or via
//! [`PanelView::to_html`].

pub mod markup;
pub mod pitstops;
pub mod placeholder;
pub mod positions;
pub mod replay;
pub mod track;
pub mod tyre_strategy;

use serde::Serialize;

pub use pitstops::PitstopSummary;
pub use placeholder::{ErrorPlaceholder, Notice};
pub use positions::PositionPlot;
pub use replay::ReplayFrame;
pub use track::{TrackCard, TrackShape};
pub use tyre_strategy::StrategyChart;

/// Everything a container can show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "view", rename_all = "snake_case")]
pub enum PanelView {
    /// Server-rendered fragment inserted verbatim.
    Html(String),
    PositionChart(PositionPlot),
    TyreStrategy(StrategyChart),
    Pitstops(PitstopSummary),
    TrackCard(TrackCard),
    TrackMap(TrackShape),
    Replay(ReplayFrame),
    Notice(Notice),
    Failure(ErrorPlaceholder),
}

impl PanelView {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}
