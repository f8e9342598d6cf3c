use crate::api::{decode_html, decode_json, ApiResponse, Endpoint};
use crate::domain::{ContainerId, PanelKind, Selection};
use crate::error::FetchError;
use crate::models::{
    DriverPositions, DriverStrategy, PitstopAnalysis, ReplayCar, TrackInfo, TrackStats,
};
use crate::render::{pitstops, positions, replay, track, tyre_strategy, PanelView};

use super::PanelSpec;

const TRACK_CONTAINERS: &[ContainerId] = &[ContainerId::TrackStats, ContainerId::TrackMap];

/// Card and fallback ellipse for when the circuit cannot be shown.
pub fn track_fallback(selection: &Selection) -> Vec<(ContainerId, PanelView)> {
    vec![
        (
            ContainerId::TrackStats,
            PanelView::TrackCard(track::unavailable_card(selection.event_name())),
        ),
        (
            ContainerId::TrackMap,
            PanelView::TrackMap(track::TrackShape::Fallback),
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsPanel;

impl PanelSpec for ResultsPanel {
    type Payload = String;

    fn kind(&self) -> PanelKind {
        PanelKind::Results
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Results
    }

    fn containers(&self) -> &'static [ContainerId] {
        &[ContainerId::Results]
    }

    fn decode(&self, response: &ApiResponse) -> Result<String, FetchError> {
        decode_html(response)
    }

    fn render(&self, fragment: String, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        vec![(ContainerId::Results, PanelView::Html(fragment))]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PositionsPanel;

impl PanelSpec for PositionsPanel {
    type Payload = Vec<DriverPositions>;

    fn kind(&self) -> PanelKind {
        PanelKind::Positions
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Positions
    }

    fn containers(&self) -> &'static [ContainerId] {
        &[ContainerId::PositionChart]
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError> {
        decode_json(response)
    }

    /// An empty field leaves the chart untouched.
    fn render(&self, drivers: Self::Payload, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        positions::render(&drivers)
            .map(|plot| (ContainerId::PositionChart, PanelView::PositionChart(plot)))
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TyreStrategyPanel;

impl PanelSpec for TyreStrategyPanel {
    type Payload = Vec<DriverStrategy>;

    fn kind(&self) -> PanelKind {
        PanelKind::TyreStrategy
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::TyreStrategy
    }

    fn containers(&self) -> &'static [ContainerId] {
        &[ContainerId::TyreStrategy]
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError> {
        decode_json(response)
    }

    fn render(&self, drivers: Self::Payload, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        vec![(ContainerId::TyreStrategy, tyre_strategy::render(drivers))]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PitstopPanel;

impl PanelSpec for PitstopPanel {
    type Payload = PitstopAnalysis;

    fn kind(&self) -> PanelKind {
        PanelKind::Pitstops
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::PitstopAnalysis
    }

    fn containers(&self) -> &'static [ContainerId] {
        &[ContainerId::Pitstops]
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError> {
        decode_json(response)
    }

    fn render(&self, analysis: Self::Payload, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        vec![(ContainerId::Pitstops, pitstops::render(&analysis))]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrackStatsPanel;

impl PanelSpec for TrackStatsPanel {
    type Payload = TrackStats;

    fn kind(&self) -> PanelKind {
        PanelKind::TrackStats
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::TrackStats
    }

    fn containers(&self) -> &'static [ContainerId] {
        TRACK_CONTAINERS
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError> {
        decode_json(response)
    }

    fn render(&self, stats: Self::Payload, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        vec![
            (
                ContainerId::TrackStats,
                PanelView::TrackCard(track::stats_card(&stats)),
            ),
            (
                ContainerId::TrackMap,
                PanelView::TrackMap(track::shape(&stats.coordinates)),
            ),
        ]
    }

    fn render_failure(&self, selection: &Selection) -> Vec<(ContainerId, PanelView)> {
        track_fallback(selection)
    }
}

/// The older track panel: a single info card plus the outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackInfoPanel;

impl PanelSpec for TrackInfoPanel {
    type Payload = TrackInfo;

    fn kind(&self) -> PanelKind {
        PanelKind::TrackInfo
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::TrackInfo
    }

    fn containers(&self) -> &'static [ContainerId] {
        TRACK_CONTAINERS
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError> {
        decode_json(response)
    }

    fn render(&self, info: Self::Payload, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        vec![
            (
                ContainerId::TrackStats,
                PanelView::TrackCard(track::info_card(&info)),
            ),
            (
                ContainerId::TrackMap,
                PanelView::TrackMap(track::shape(&info.coordinates)),
            ),
        ]
    }

    fn render_failure(&self, selection: &Selection) -> Vec<(ContainerId, PanelView)> {
        track_fallback(selection)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayPanel;

impl PanelSpec for ReplayPanel {
    type Payload = Vec<ReplayCar>;

    fn kind(&self) -> PanelKind {
        PanelKind::Replay
    }

    fn endpoint(&self) -> Endpoint {
        Endpoint::Replay
    }

    fn containers(&self) -> &'static [ContainerId] {
        &[ContainerId::Replay]
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError> {
        decode_json(response)
    }

    fn render(&self, cars: Self::Payload, _: &Selection) -> Vec<(ContainerId, PanelView)> {
        vec![(ContainerId::Replay, replay::render(&cars))]
    }
}
