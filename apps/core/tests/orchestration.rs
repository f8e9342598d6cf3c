use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use async_trait::async_trait;
use pitwall_core::render::placeholder::ErrorPlaceholder;
use pitwall_core::{
    ApiRequest, ApiResponse, Backend, CapabilitySet, ContainerId, Endpoint, FailureKind,
    FetchError, MemorySurface, Method, Orchestrator, PanelKind, PanelOutcome, PanelView,
};

/// Answers like the dashboard server would for the 2023 Bahrain Grand Prix,
/// except that tyre strategy comes back with an `error` field.
#[derive(Default)]
struct BahrainServer {
    requests: RefCell<Vec<ApiRequest>>,
}

#[async_trait(?Send)]
impl Backend for BahrainServer {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        let body = match request.endpoint {
            Endpoint::Events => r#"["Bahrain Grand Prix", "Saudi Arabian Grand Prix"]"#,
            Endpoint::Results => {
                r#"<table class="results-table"><tr><td>1</td><td>Max Verstappen</td></tr></table>"#
            }
            Endpoint::Positions => {
                r##"[{"name": "VER", "laps": [1, 2], "positions": [1, 1], "color": "#3671C6"},
                     {"name": "ALO", "laps": [1, 2], "positions": [5, null], "color": "#358C75"}]"##
            }
            Endpoint::TyreStrategy => r#"{"error": "Tyre data unavailable"}"#,
            Endpoint::PitstopAnalysis => {
                r#"{"total_pitstops": 1, "teams": {"Ferrari": {"avg_time": 23.0, "total_stops": 1, "stops": [{"driver": "LEC", "time": 23.0}]}}}"#
            }
            Endpoint::TrackStats => {
                r#"{"track_info": {"name": "Bahrain International Circuit"}, "coordinates": [{"x": 1, "y": 2}, {"x": 3, "y": 4}]}"#
            }
            Endpoint::TrackInfo | Endpoint::Replay => return Ok(ApiResponse::new(404, "")),
        };
        Ok(ApiResponse::ok(body))
    }
}

#[tokio::test]
async fn bahrain_2023_with_failing_tyre_strategy() -> Result<(), Box<dyn Error>> {
    let server = Rc::new(BahrainServer::default());
    let surface = Rc::new(MemorySurface::new());
    let orchestrator = Orchestrator::builder(server.clone(), surface.clone())
        .with_capabilities(&CapabilitySet::standard())
        .build()?;

    let report = orchestrator
        .initialize("2023", Some("Bahrain Grand Prix".to_string()))
        .await;

    assert_eq!(report.events, Some(PanelOutcome::Rendered));
    assert_eq!(report.outcome(PanelKind::Results), Some(PanelOutcome::Rendered));
    assert_eq!(report.outcome(PanelKind::Positions), Some(PanelOutcome::Rendered));
    assert_eq!(
        report.outcome(PanelKind::TyreStrategy),
        Some(PanelOutcome::Errored(FailureKind::ApplicationError))
    );
    assert_eq!(report.outcome(PanelKind::Pitstops), Some(PanelOutcome::Rendered));
    assert_eq!(report.outcome(PanelKind::TrackStats), Some(PanelOutcome::Rendered));

    assert!(matches!(
        surface.view(ContainerId::Results),
        Some(PanelView::Html(html)) if html.contains("Max Verstappen")
    ));
    assert!(matches!(
        surface.view(ContainerId::PositionChart),
        Some(PanelView::PositionChart(plot)) if plot.data.len() == 2
    ));
    assert_eq!(
        surface.view(ContainerId::TyreStrategy),
        Some(PanelView::Failure(ErrorPlaceholder::for_panel(
            PanelKind::TyreStrategy
        )))
    );

    for id in [
        ContainerId::Results,
        ContainerId::PositionChart,
        ContainerId::TyreStrategy,
        ContainerId::Pitstops,
        ContainerId::TrackStats,
        ContainerId::TrackMap,
    ] {
        assert!(!surface.indicator_visible(id), "{id:?} still busy");
        let nodes = surface.container(id).map(|state| state.indicator_nodes);
        assert_eq!(nodes, Some(1), "{id:?} should have exactly one indicator node");
    }
    assert_eq!(orchestrator.indicator_stats().outstanding(), 0);
    Ok(())
}

#[tokio::test]
async fn panel_requests_are_form_posts_of_the_selection() -> Result<(), Box<dyn Error>> {
    let server = Rc::new(BahrainServer::default());
    let surface = Rc::new(MemorySurface::new());
    let orchestrator = Orchestrator::builder(server.clone(), surface)
        .with_pitstops()
        .build()?;

    orchestrator.select_year("2023").await?;

    let requests = server.requests.borrow();
    assert_eq!(requests[0].endpoint, Endpoint::Events);
    assert_eq!(requests[0].method(), Method::Get);
    for request in requests.iter().skip(1) {
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.param("year"), Some("2023"));
        assert_eq!(request.param("event"), Some("Bahrain Grand Prix"));
    }
    assert!(!requests
        .iter()
        .any(|request| request.endpoint == Endpoint::TyreStrategy));
    Ok(())
}
