//! Selection-driven fan-out over the panel pipelines.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use futures::future::{join_all, FutureExt, LocalBoxFuture};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::api::{decode_json, ApiRequest, Backend};
use crate::domain::{ContainerId, IndicatorSize, PanelKind, Selection};
use crate::error::{CapabilityParseError, HandleConflict, SelectionError};
use crate::generation::{Generations, SelectionToken};
use crate::indicator::{IndicatorGuard, IndicatorManager, IndicatorStats};
use crate::pipeline::panels::{
    track_fallback, PitstopPanel, PositionsPanel, ReplayPanel, ResultsPanel, TrackInfoPanel,
    TrackStatsPanel, TyreStrategyPanel,
};
use crate::pipeline::{FetchPipeline, PanelOutcome, PanelPipeline, PipelineContext};
use crate::surface::{HandleRegistry, PanelHandle, Surface};

/// Containers whose indicators go up as soon as a results chain starts.
const CHAIN_CONTAINERS: [ContainerId; 6] = [
    ContainerId::Results,
    ContainerId::TrackStats,
    ContainerId::TrackMap,
    ContainerId::PositionChart,
    ContainerId::TyreStrategy,
    ContainerId::Pitstops,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Stats,
    Info,
}

/// The optional panels wired into a deployment. Results and positions are
/// always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    pub tyre_strategy: bool,
    pub pitstops: bool,
    pub track: Option<TrackSource>,
    pub replay: bool,
}

impl CapabilitySet {
    pub const fn standard() -> Self {
        Self {
            tyre_strategy: true,
            pitstops: true,
            track: Some(TrackSource::Stats),
            replay: false,
        }
    }
}

impl FromStr for CapabilitySet {
    type Err = CapabilityParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut set = Self::default();
        for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            match name {
                "tyre_strategy" => set.tyre_strategy = true,
                "pitstops" => set.pitstops = true,
                "track_stats" => set.track = Some(TrackSource::Stats),
                "track_info" => set.track = Some(TrackSource::Info),
                "replay" => set.replay = true,
                other => return Err(CapabilityParseError(other.to_string())),
            }
        }
        Ok(set)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.tyre_strategy {
            names.push("tyre_strategy");
        }
        if self.pitstops {
            names.push("pitstops");
        }
        match self.track {
            Some(TrackSource::Stats) => names.push("track_stats"),
            Some(TrackSource::Info) => names.push("track_info"),
            None => {}
        }
        if self.replay {
            names.push("replay");
        }
        f.write_str(&names.join(","))
    }
}

/// What one selection change did, panel by panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub generation: u64,
    pub selection: Selection,
    /// Outcome of the event-list refresh, when the run included one.
    pub events: Option<PanelOutcome>,
    pub outcomes: Vec<(PanelKind, PanelOutcome)>,
}

impl RunReport {
    fn new(token: &SelectionToken, selection: Selection) -> Self {
        Self {
            generation: token.generation(),
            selection,
            events: None,
            outcomes: Vec::new(),
        }
    }

    pub fn outcome(&self, kind: PanelKind) -> Option<PanelOutcome> {
        self.outcomes
            .iter()
            .find(|(panel, _)| *panel == kind)
            .map(|(_, outcome)| *outcome)
    }
}

pub struct OrchestratorBuilder {
    backend: Rc<dyn Backend>,
    surface: Rc<dyn Surface>,
    capabilities: CapabilitySet,
}

impl OrchestratorBuilder {
    #[must_use]
    pub fn with_tyre_strategy(mut self) -> Self {
        self.capabilities.tyre_strategy = true;
        self
    }

    #[must_use]
    pub fn with_pitstops(mut self) -> Self {
        self.capabilities.pitstops = true;
        self
    }

    #[must_use]
    pub fn with_track(mut self, source: TrackSource) -> Self {
        self.capabilities.track = Some(source);
        self
    }

    #[must_use]
    pub fn with_replay(mut self) -> Self {
        self.capabilities.replay = true;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: &CapabilitySet) -> Self {
        self.capabilities = *capabilities;
        self
    }

    pub fn build(self) -> Result<Orchestrator, HandleConflict> {
        let capabilities = self.capabilities;
        let generations = Generations::new();
        let indicators = IndicatorManager::new(Rc::clone(&self.surface), generations.clone());
        let mut registry = HandleRegistry::new(Rc::clone(&self.surface));

        let results = FetchPipeline::new(ResultsPanel, &mut registry)?;
        let positions = FetchPipeline::new(PositionsPanel, &mut registry)?;
        let tyre_strategy = optional(capabilities.tyre_strategy, TyreStrategyPanel, &mut registry)?;
        let pitstops = optional(capabilities.pitstops, PitstopPanel, &mut registry)?;
        let track: Option<Box<dyn PanelPipeline>> = match capabilities.track {
            Some(TrackSource::Stats) => Some(Box::new(FetchPipeline::new(
                TrackStatsPanel,
                &mut registry,
            )?)),
            Some(TrackSource::Info) => Some(Box::new(FetchPipeline::new(
                TrackInfoPanel,
                &mut registry,
            )?)),
            None => None,
        };
        let track_fallback = if track.is_none() {
            registry.claim_all(&[ContainerId::TrackStats, ContainerId::TrackMap])?
        } else {
            Vec::new()
        };
        let replay = optional(capabilities.replay, ReplayPanel, &mut registry)?;

        info!("Dashboard panels: results,positions,{capabilities}");

        Ok(Orchestrator {
            backend: self.backend,
            surface: self.surface,
            generations,
            indicators,
            capabilities,
            selection: RefCell::new(Selection::default()),
            events: RefCell::new(Vec::new()),
            pending_year: RefCell::new(None),
            results,
            positions,
            tyre_strategy,
            pitstops,
            track,
            replay,
            track_fallback,
        })
    }
}

fn optional<P>(
    enabled: bool,
    spec: P,
    registry: &mut HandleRegistry,
) -> Result<Option<Box<dyn PanelPipeline>>, HandleConflict>
where
    P: crate::pipeline::PanelSpec + 'static,
{
    if !enabled {
        return Ok(None);
    }
    Ok(Some(Box::new(FetchPipeline::new(spec, registry)?)))
}

/// Reacts to selection changes by driving the event list, the results
/// pipeline and then every panel pipeline, each isolated from the others'
/// failures.
pub struct Orchestrator {
    backend: Rc<dyn Backend>,
    surface: Rc<dyn Surface>,
    generations: Generations,
    indicators: IndicatorManager,
    capabilities: CapabilitySet,
    /// Year, calendar and event are only ever committed together, once the
    /// calendar for the year has arrived.
    selection: RefCell<Selection>,
    events: RefCell<Vec<String>>,
    /// Year whose calendar is in flight.
    pending_year: RefCell<Option<String>>,
    results: FetchPipeline<ResultsPanel>,
    positions: FetchPipeline<PositionsPanel>,
    tyre_strategy: Option<Box<dyn PanelPipeline>>,
    pitstops: Option<Box<dyn PanelPipeline>>,
    track: Option<Box<dyn PanelPipeline>>,
    replay: Option<Box<dyn PanelPipeline>>,
    track_fallback: Vec<PanelHandle>,
}

impl Orchestrator {
    pub fn builder(backend: Rc<dyn Backend>, surface: Rc<dyn Surface>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            backend,
            surface,
            capabilities: CapabilitySet::default(),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection.borrow().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub const fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub const fn indicators(&self) -> &IndicatorManager {
        &self.indicators
    }

    pub fn indicator_stats(&self) -> IndicatorStats {
        self.indicators.stats()
    }

    /// First page load: every panel shows its indicator straight away, then
    /// the calendar and the results chain load.
    pub async fn initialize(&self, year: &str, event: Option<String>) -> RunReport {
        let token = self.generations.advance();
        let pre_shown = self.show_chain_indicators();
        self.load_events(token, year.to_string(), event, pre_shown)
            .await
    }

    pub async fn select_year(&self, year: &str) -> Result<RunReport, SelectionError> {
        if year.trim().is_empty() {
            return Err(SelectionError::EmptyYear);
        }
        let token = self.generations.advance();
        let wanted = self.selection.borrow().event.clone();
        Ok(self
            .load_events(token, year.to_string(), wanted, Vec::new())
            .await)
    }

    /// Only events of the committed calendar are accepted; while another
    /// year's calendar is loading the choice is rejected.
    pub async fn select_event(&self, event: &str) -> Result<RunReport, SelectionError> {
        if let Some(year) = self.pending_year.borrow().clone() {
            return Err(SelectionError::CalendarPending { year });
        }
        if !self.events.borrow().iter().any(|known| known == event) {
            return Err(SelectionError::UnknownEvent {
                year: self.selection.borrow().year.clone(),
                event: event.to_string(),
            });
        }
        let token = self.generations.advance();
        self.selection.borrow_mut().event = Some(event.to_string());
        self.surface
            .set_event_options(&self.events.borrow(), Some(event));
        Ok(self.run_results_chain(token, Vec::new()).await)
    }

    /// Reloads every panel for the current selection. A calendar still in
    /// flight is requested again instead, so its year gets committed.
    pub async fn refresh(&self) -> RunReport {
        let token = self.generations.advance();
        let pending = self.pending_year.borrow().clone();
        match pending {
            Some(year) => {
                let wanted = self.selection.borrow().event.clone();
                self.load_events(token, year, wanted, Vec::new()).await
            }
            None => self.run_results_chain(token, Vec::new()).await,
        }
    }

    async fn load_events(
        &self,
        token: SelectionToken,
        year: String,
        wanted: Option<String>,
        carried: Vec<IndicatorGuard>,
    ) -> RunReport {
        *self.pending_year.borrow_mut() = Some(year.clone());
        let guard = self
            .indicators
            .show(ContainerId::EventSelect, IndicatorSize::Small);

        let fetched = self
            .backend
            .send(&ApiRequest::events(&year))
            .await
            .and_then(|response| decode_json::<Vec<String>>(&response));

        if token.is_stale() {
            debug!("Calendar for {year} arrived after a newer selection, discarded");
            let mut report = RunReport::new(&token, self.selection());
            report.events = Some(PanelOutcome::Discarded);
            return report;
        }

        self.pending_year.borrow_mut().take();
        let events = match fetched {
            Ok(events) => events,
            Err(err) => {
                error!("Could not load the {year} calendar: {err}");
                self.events.borrow_mut().clear();
                *self.selection.borrow_mut() = Selection::new(year, None);
                self.surface.set_event_options(&[], None);
                if let Some(guard) = guard {
                    guard.remove();
                }
                let mut report = RunReport::new(&token, self.selection());
                report.events = Some(PanelOutcome::Errored(err.kind()));
                return report;
            }
        };

        let selected = wanted
            .filter(|current| events.contains(current))
            .or_else(|| events.first().cloned());
        self.surface.set_event_options(&events, selected.as_deref());
        *self.selection.borrow_mut() = Selection::new(year, selected);
        *self.events.borrow_mut() = events;
        if let Some(guard) = guard {
            guard.remove();
        }

        let mut report = self.run_results_chain(token, carried).await;
        report.events = Some(PanelOutcome::Rendered);
        report
    }

    async fn run_results_chain(
        &self,
        token: SelectionToken,
        carried: Vec<IndicatorGuard>,
    ) -> RunReport {
        let selection = self.selection();
        let mut report = RunReport::new(&token, selection.clone());
        if !selection.is_complete() {
            warn!("No event selected for {}, nothing to load", selection.year);
            return report;
        }

        let guards = self.show_chain_indicators();
        drop(carried);

        let ctx = PipelineContext {
            selection,
            token,
            backend: Rc::clone(&self.backend),
            indicators: self.indicators.clone(),
        };

        let (results_guards, mut rest) = split_guards(guards, self.results.containers());
        let outcome = self.results.run(&ctx, results_guards).await;
        report.outcomes.push((PanelKind::Results, outcome));
        match outcome {
            PanelOutcome::Rendered => {}
            PanelOutcome::Discarded => return report,
            PanelOutcome::Errored(_) | PanelOutcome::Skipped => {
                debug!("Results failed, releasing every panel indicator");
                return report;
            }
        }

        let wired: [(PanelKind, Option<&dyn PanelPipeline>); 5] = [
            (PanelKind::Positions, Some(&self.positions)),
            (PanelKind::TyreStrategy, self.tyre_strategy.as_deref()),
            (PanelKind::Pitstops, self.pitstops.as_deref()),
            (PanelKind::TrackStats, self.track.as_deref()),
            (PanelKind::Replay, self.replay.as_deref()),
        ];

        let mut runs: Vec<LocalBoxFuture<'_, (PanelKind, PanelOutcome)>> = Vec::new();
        for (kind, pipeline) in wired {
            match pipeline {
                Some(pipeline) => {
                    let (inherited, remaining) =
                        split_guards(std::mem::take(&mut rest), pipeline.containers());
                    rest = remaining;
                    let ctx = &ctx;
                    runs.push(
                        async move { (pipeline.kind(), pipeline.run(ctx, inherited).await) }
                            .boxed_local(),
                    );
                }
                None => {
                    if kind == PanelKind::TrackStats {
                        warn!("Track statistics not wired in, showing the static card");
                        self.write_track_fallback(&ctx.selection);
                    } else {
                        debug!("{} panel not wired in", kind.as_str());
                    }
                    report.outcomes.push((kind, PanelOutcome::Skipped));
                }
            }
        }
        drop(rest);

        report.outcomes.extend(join_all(runs).await);
        report
    }

    fn show_chain_indicators(&self) -> Vec<IndicatorGuard> {
        let replay = self.replay.is_some().then_some(ContainerId::Replay);
        CHAIN_CONTAINERS
            .into_iter()
            .chain(replay)
            .filter_map(|id| self.indicators.show(id, id.indicator_size()))
            .collect()
    }

    fn write_track_fallback(&self, selection: &Selection) {
        for (id, view) in track_fallback(selection) {
            if let Some(handle) = self.track_fallback.iter().find(|handle| handle.id() == id) {
                handle.write(view);
            }
        }
    }
}

fn split_guards(
    guards: Vec<IndicatorGuard>,
    containers: &[ContainerId],
) -> (Vec<IndicatorGuard>, Vec<IndicatorGuard>) {
    guards
        .into_iter()
        .partition(|guard| containers.contains(&guard.id()))
}
