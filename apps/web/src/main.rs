mod console;
mod dom;
mod fetch;

use std::rc::Rc;

use log::{info, warn, LevelFilter};
use pitwall_core::orchestrator::TrackSource;
use pitwall_core::{Backend, CapabilitySet, ContainerId, Orchestrator, Surface};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlSelectElement};

use dom::DomSurface;
use fetch::FetchBackend;

const YEAR_SELECT_ID: &str = "year-select";

fn main() {
    if let Err(e) = console::init(LevelFilter::Info) {
        web_sys::console::error_1(&format!("Logger unavailable: {e}").into());
    }

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        web_sys::console::error_1(&"No document to attach to".into());
        return;
    };

    let present: Vec<ContainerId> = ContainerId::ALL
        .into_iter()
        .filter(|id| document.get_element_by_id(id.dom_id()).is_some())
        .collect();
    let capabilities = capabilities_for(&present);
    info!("Wiring panels: {capabilities}");

    let backend: Rc<dyn Backend> = Rc::new(FetchBackend::new(""));
    let surface: Rc<dyn Surface> = Rc::new(DomSurface::new(document.clone()));
    let orchestrator = match Orchestrator::builder(backend, surface)
        .with_capabilities(&capabilities)
        .build()
    {
        Ok(orchestrator) => Rc::new(orchestrator),
        Err(e) => {
            web_sys::console::error_1(&format!("Dashboard wiring failed: {e}").into());
            return;
        }
    };

    listen_for_year(&document, &orchestrator);
    listen_for_event(&document, &orchestrator);

    let year = select_value(&document, YEAR_SELECT_ID).unwrap_or_default();
    let event = select_value(&document, ContainerId::EventSelect.dom_id());
    spawn_local(async move {
        let report = orchestrator.initialize(&year, event).await;
        info!(
            "Loaded {} with {} panel(s)",
            report.selection.year,
            report.outcomes.len()
        );
    });
}

/// Optional panels are wired only when the page has somewhere to draw them.
fn capabilities_for(present: &[ContainerId]) -> CapabilitySet {
    let has = |id: ContainerId| present.contains(&id);
    CapabilitySet {
        tyre_strategy: has(ContainerId::TyreStrategy),
        pitstops: has(ContainerId::Pitstops),
        track: (has(ContainerId::TrackStats) || has(ContainerId::TrackMap))
            .then_some(TrackSource::Stats),
        replay: has(ContainerId::Replay),
    }
}

fn select_value(document: &Document, id: &str) -> Option<String> {
    document
        .get_element_by_id(id)?
        .dyn_into::<HtmlSelectElement>()
        .ok()
        .map(|select| select.value())
        .filter(|value| !value.is_empty())
}

fn listen_for_year(document: &Document, orchestrator: &Rc<Orchestrator>) {
    let Some(select) = document.get_element_by_id(YEAR_SELECT_ID) else {
        warn!("No #{YEAR_SELECT_ID} on the page, season is fixed");
        return;
    };
    let orchestrator = Rc::clone(orchestrator);
    let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(year) = changed_value(&event) else {
            return;
        };
        let orchestrator = Rc::clone(&orchestrator);
        spawn_local(async move {
            if let Err(e) = orchestrator.select_year(&year).await {
                warn!("{e}");
            }
        });
    });
    if let Err(e) =
        select.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
    {
        warn!("Could not listen on #{YEAR_SELECT_ID}: {e:?}");
    }
    on_change.forget();
}

fn listen_for_event(document: &Document, orchestrator: &Rc<Orchestrator>) {
    let id = ContainerId::EventSelect.dom_id();
    let Some(select) = document.get_element_by_id(id) else {
        warn!("No #{id} on the page, race is fixed");
        return;
    };
    let orchestrator = Rc::clone(orchestrator);
    let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(race) = changed_value(&event) else {
            return;
        };
        let orchestrator = Rc::clone(&orchestrator);
        spawn_local(async move {
            if let Err(e) = orchestrator.select_event(&race).await {
                warn!("{e}");
            }
        });
    });
    if let Err(e) =
        select.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
    {
        warn!("Could not listen on #{id}: {e:?}");
    }
    on_change.forget();
}

fn changed_value(event: &Event) -> Option<String> {
    event
        .target()?
        .dyn_into::<HtmlSelectElement>()
        .ok()
        .map(|select| select.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_wires_every_optional_panel() {
        let capabilities = capabilities_for(&ContainerId::ALL);

        assert!(capabilities.tyre_strategy);
        assert!(capabilities.pitstops);
        assert!(capabilities.replay);
        assert_eq!(capabilities.track, Some(TrackSource::Stats));
    }

    #[test]
    fn minimal_page_keeps_only_the_results_chain() {
        let capabilities = capabilities_for(&[
            ContainerId::EventSelect,
            ContainerId::Results,
            ContainerId::PositionChart,
        ]);

        assert_eq!(capabilities, CapabilitySet::default());
    }

    #[test]
    fn track_map_alone_enables_the_track_panel() {
        let capabilities = capabilities_for(&[ContainerId::TrackMap]);

        assert_eq!(capabilities.track, Some(TrackSource::Stats));
        assert!(!capabilities.pitstops);
    }
}
