//! Fetch pipelines: indicator, request, render, release for one panel.

mod machine;
pub mod panels;

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use log::{debug, error};
use serde::Serialize;

use crate::api::{ApiRequest, ApiResponse, Backend, Endpoint};
use crate::domain::{ContainerId, IndicatorSize, PanelKind, Selection};
use crate::error::{FailureKind, FetchError, HandleConflict};
use crate::generation::SelectionToken;
use crate::indicator::{IndicatorGuard, IndicatorManager};
use crate::render::placeholder::ErrorPlaceholder;
use crate::render::PanelView;
use crate::surface::{HandleRegistry, PanelHandle};

pub use machine::{PipelineEvent, PipelineMachine, PipelineState};

/// Outcome of one request as seen by the run that issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelResult<T> {
    /// The run lost its panel to a newer selection before the answer came.
    Pending,
    Success(T),
    Failure(FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "failure", rename_all = "snake_case")]
pub enum PanelOutcome {
    Rendered,
    Errored(FailureKind),
    /// Superseded by a newer selection; nothing was written.
    Discarded,
    /// Not wired into this deployment.
    Skipped,
}

/// What one panel fetches and how it draws the answer.
pub trait PanelSpec {
    type Payload;

    fn kind(&self) -> PanelKind;

    fn endpoint(&self) -> Endpoint;

    /// Containers this panel owns and writes into.
    fn containers(&self) -> &'static [ContainerId];

    fn indicator_size(&self, id: ContainerId) -> IndicatorSize {
        id.indicator_size()
    }

    fn decode(&self, response: &ApiResponse) -> Result<Self::Payload, FetchError>;

    fn render(&self, payload: Self::Payload, selection: &Selection)
        -> Vec<(ContainerId, PanelView)>;

    fn render_failure(&self, _selection: &Selection) -> Vec<(ContainerId, PanelView)> {
        let placeholder = ErrorPlaceholder::for_panel(self.kind());
        self.containers()
            .iter()
            .map(|id| (*id, PanelView::Failure(placeholder.clone())))
            .collect()
    }
}

/// Everything a run needs from the selection that triggered it.
pub struct PipelineContext {
    pub selection: Selection,
    pub token: SelectionToken,
    pub backend: Rc<dyn Backend>,
    pub indicators: IndicatorManager,
}

/// A panel pipeline as the orchestrator holds it.
#[async_trait(?Send)]
pub trait PanelPipeline {
    fn kind(&self) -> PanelKind;

    fn containers(&self) -> &'static [ContainerId];

    fn state(&self) -> PipelineState;

    /// Runs to a terminal state. `inherited` are indicator guards shown on
    /// this panel's behalf before the run started; they are released once the
    /// run holds its own.
    async fn run(&self, ctx: &PipelineContext, inherited: Vec<IndicatorGuard>) -> PanelOutcome;
}

pub struct FetchPipeline<P: PanelSpec> {
    spec: P,
    handles: Vec<PanelHandle>,
    machine: RefCell<PipelineMachine>,
}

impl<P: PanelSpec> FetchPipeline<P> {
    pub fn new(spec: P, registry: &mut HandleRegistry) -> Result<Self, HandleConflict> {
        let handles = registry.claim_all(spec.containers())?;
        let machine = RefCell::new(PipelineMachine::new(spec.kind()));
        Ok(Self {
            spec,
            handles,
            machine,
        })
    }

    async fn fetch(&self, ctx: &PipelineContext) -> PanelResult<P::Payload> {
        let request = ApiRequest::for_selection(self.spec.endpoint(), &ctx.selection);
        let response = ctx.backend.send(&request).await;

        if ctx.token.is_stale() || !self.machine.borrow().owned_by(ctx.token.generation()) {
            return PanelResult::Pending;
        }
        match response.and_then(|response| self.spec.decode(&response)) {
            Ok(payload) => PanelResult::Success(payload),
            Err(err) => PanelResult::Failure(err),
        }
    }

    fn write_all(&self, views: Vec<(ContainerId, PanelView)>) {
        for (id, view) in views {
            match self.handles.iter().find(|handle| handle.id() == id) {
                Some(handle) => {
                    handle.write(view);
                }
                None => debug!(
                    "{} pipeline does not own #{}",
                    self.spec.kind().as_str(),
                    id.dom_id()
                ),
            }
        }
    }

    fn finish(&self, event: PipelineEvent) {
        if let Err(err) = self.machine.borrow_mut().process(event) {
            error!("{} pipeline: {err}", self.spec.kind().as_str());
        }
    }
}

#[async_trait(?Send)]
impl<P: PanelSpec> PanelPipeline for FetchPipeline<P> {
    fn kind(&self) -> PanelKind {
        self.spec.kind()
    }

    fn containers(&self) -> &'static [ContainerId] {
        self.spec.containers()
    }

    fn state(&self) -> PipelineState {
        self.machine.borrow().state()
    }

    async fn run(&self, ctx: &PipelineContext, inherited: Vec<IndicatorGuard>) -> PanelOutcome {
        let kind = self.spec.kind();
        if ctx.token.is_stale() {
            debug!("{} run for a superseded selection skipped", kind.as_str());
            return PanelOutcome::Discarded;
        }

        let guards: Vec<IndicatorGuard> = self
            .spec
            .containers()
            .iter()
            .filter_map(|id| ctx.indicators.show(*id, self.spec.indicator_size(*id)))
            .collect();
        drop(inherited);

        if let Err(err) = self.machine.borrow_mut().begin(ctx.token.generation()) {
            error!("{} pipeline: {err}", kind.as_str());
            return PanelOutcome::Discarded;
        }

        let outcome = match self.fetch(ctx).await {
            PanelResult::Pending => {
                debug!(
                    "Late {} response for generation {} discarded",
                    kind.as_str(),
                    ctx.token.generation()
                );
                PanelOutcome::Discarded
            }
            PanelResult::Success(payload) => {
                self.write_all(self.spec.render(payload, &ctx.selection));
                self.finish(PipelineEvent::Resolve);
                PanelOutcome::Rendered
            }
            PanelResult::Failure(err) => {
                error!(
                    "Could not load {} for {} {}: {err}",
                    kind.label(),
                    ctx.selection.year,
                    ctx.selection.event_name()
                );
                self.write_all(self.spec.render_failure(&ctx.selection));
                self.finish(PipelineEvent::Fail);
                PanelOutcome::Errored(err.kind())
            }
        };

        drop(guards);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::panels::{TrackStatsPanel, TyreStrategyPanel};
    use super::*;
    use crate::generation::Generations;
    use crate::render::TrackShape;
    use crate::surface::MemorySurface;
    use crate::testing::{ScriptedBackend, TYRES};

    struct Rig {
        backend: Rc<ScriptedBackend>,
        surface: Rc<MemorySurface>,
        generations: Generations,
        indicators: IndicatorManager,
        registry: HandleRegistry,
    }

    impl Rig {
        fn new() -> Self {
            let backend = Rc::new(ScriptedBackend::new());
            let surface = Rc::new(MemorySurface::new());
            let generations = Generations::new();
            let indicators = IndicatorManager::new(surface.clone(), generations.clone());
            let registry = HandleRegistry::new(surface.clone());
            Self {
                backend,
                surface,
                generations,
                indicators,
                registry,
            }
        }

        fn context(&self) -> PipelineContext {
            PipelineContext {
                selection: Selection::new("2023", Some("Bahrain Grand Prix".to_string())),
                token: self.generations.advance(),
                backend: self.backend.clone(),
                indicators: self.indicators.clone(),
            }
        }
    }

    #[tokio::test]
    async fn success_renders_then_releases() -> Result<(), HandleConflict> {
        let mut rig = Rig::new();
        let pipeline = FetchPipeline::new(TyreStrategyPanel, &mut rig.registry)?;
        rig.backend.respond(Endpoint::TyreStrategy, TYRES);

        let outcome = pipeline.run(&rig.context(), Vec::new()).await;

        assert_eq!(outcome, PanelOutcome::Rendered);
        assert_eq!(pipeline.state(), PipelineState::Rendered);
        assert!(matches!(
            rig.surface.view(ContainerId::TyreStrategy),
            Some(PanelView::TyreStrategy(_))
        ));
        assert!(!rig.surface.indicator_visible(ContainerId::TyreStrategy));
        assert_eq!(rig.indicators.stats().outstanding(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn error_field_renders_the_placeholder() -> Result<(), HandleConflict> {
        let mut rig = Rig::new();
        let pipeline = FetchPipeline::new(TyreStrategyPanel, &mut rig.registry)?;
        rig.backend
            .respond(Endpoint::TyreStrategy, r#"{"error": "no tyre data"}"#);

        let outcome = pipeline.run(&rig.context(), Vec::new()).await;

        assert_eq!(outcome, PanelOutcome::Errored(FailureKind::ApplicationError));
        assert_eq!(pipeline.state(), PipelineState::Errored);
        assert_eq!(
            rig.surface.view(ContainerId::TyreStrategy),
            Some(PanelView::Failure(ErrorPlaceholder::for_panel(
                PanelKind::TyreStrategy
            )))
        );
        assert_eq!(rig.indicators.stats().outstanding(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn track_failure_falls_back_to_the_ellipse() -> Result<(), HandleConflict> {
        let mut rig = Rig::new();
        let pipeline = FetchPipeline::new(TrackStatsPanel, &mut rig.registry)?;
        rig.backend.respond(Endpoint::TrackStats, "null");

        let outcome = pipeline.run(&rig.context(), Vec::new()).await;

        assert_eq!(outcome, PanelOutcome::Errored(FailureKind::DecodeError));
        assert_eq!(
            rig.surface.view(ContainerId::TrackMap),
            Some(PanelView::TrackMap(TrackShape::Fallback))
        );
        assert!(!rig.surface.indicator_visible(ContainerId::TrackMap));
        Ok(())
    }

    #[tokio::test]
    async fn stale_context_never_fetches() -> Result<(), HandleConflict> {
        let mut rig = Rig::new();
        let pipeline = FetchPipeline::new(TyreStrategyPanel, &mut rig.registry)?;
        let ctx = rig.context();
        rig.generations.advance();

        let outcome = pipeline.run(&ctx, Vec::new()).await;

        assert_eq!(outcome, PanelOutcome::Discarded);
        assert!(rig.backend.requests().is_empty());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn inherited_indicator_is_handed_over() -> Result<(), HandleConflict> {
        let mut rig = Rig::new();
        let pipeline = FetchPipeline::new(TyreStrategyPanel, &mut rig.registry)?;
        let ctx = rig.context();
        let inherited: Vec<_> = rig
            .indicators
            .show(ContainerId::TyreStrategy, IndicatorSize::Normal)
            .into_iter()
            .collect();
        rig.backend.respond(Endpoint::TyreStrategy, "[]");

        let outcome = pipeline.run(&ctx, inherited).await;

        assert_eq!(outcome, PanelOutcome::Rendered);
        let container = rig.surface.container(ContainerId::TyreStrategy);
        assert_eq!(container.map(|state| state.indicator_nodes), Some(1));
        assert_eq!(rig.indicators.stats().shown, 2);
        assert_eq!(rig.indicators.stats().outstanding(), 0);
        Ok(())
    }
}
