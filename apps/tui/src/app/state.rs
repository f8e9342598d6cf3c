use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::Level;
use pitwall_core::error::HandleConflict;
use pitwall_core::{Backend, ContainerId, MemorySurface, Orchestrator, RunReport};
use throbber_widgets_tui::ThrobberState;

use pitwall_tui::{logger, DashboardConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub level: Option<Level>,
    pub text: String,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            level: None,
            text: text.into(),
        }
    }
}

pub struct App {
    pub running: bool,
    pub years: Vec<String>,
    pub year_index: usize,
    /// Highlighted row of the event list, not yet loaded.
    pub event_cursor: usize,
    pub status: StatusLine,
    pub throbber_state: ThrobberState,
    pub surface: Rc<MemorySurface>,
    pub(crate) orchestrator: Rc<Orchestrator>,
    pub(crate) last_report: Rc<RefCell<Option<RunReport>>>,
    pub(crate) in_flight: Rc<Cell<usize>>,
    pub(crate) reported_generation: Rc<Cell<u64>>,
    initial_event: Option<String>,
    synced_event: Option<String>,
}

impl App {
    pub fn new(config: &DashboardConfig, backend: Rc<dyn Backend>) -> Result<Self, HandleConflict> {
        let surface = Rc::new(MemorySurface::new());
        let orchestrator = Orchestrator::builder(backend, surface.clone())
            .with_capabilities(&config.capabilities)
            .build()?;

        let years = config.years();
        let initial_year = config.initial_year();
        let year_index = years
            .iter()
            .position(|year| *year == initial_year)
            .unwrap_or_else(|| years.len().saturating_sub(1));

        Ok(Self {
            running: true,
            years,
            year_index,
            event_cursor: 0,
            status: StatusLine::info("Loading calendar..."),
            throbber_state: ThrobberState::default(),
            surface,
            orchestrator: Rc::new(orchestrator),
            last_report: Rc::new(RefCell::new(None)),
            in_flight: Rc::new(Cell::new(0)),
            reported_generation: Rc::new(Cell::new(0)),
            initial_event: config.event.clone(),
            synced_event: None,
        })
    }

    pub fn year(&self) -> &str {
        self.years
            .get(self.year_index)
            .map_or("", String::as_str)
    }

    pub fn events(&self) -> Vec<String> {
        self.surface.event_options()
    }

    pub fn selected_event(&self) -> Option<String> {
        self.surface.selected_event()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.get() > 0 || !self.surface.busy_containers().is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn wired(&self, id: ContainerId) -> bool {
        let capabilities = self.orchestrator.capabilities();
        match id {
            ContainerId::TyreStrategy => capabilities.tyre_strategy,
            ContainerId::Pitstops => capabilities.pitstops,
            ContainerId::Replay => capabilities.replay,
            _ => true,
        }
    }

    pub(crate) fn take_initial_event(&mut self) -> Option<String> {
        self.initial_event.take()
    }

    /// Called once per frame: advances the spinner, follows the event the
    /// orchestrator settled on and picks up the latest log line.
    pub fn update(&mut self) {
        if self.is_loading() {
            self.throbber_state.calc_next();
        }

        let selected = self.surface.selected_event();
        if selected != self.synced_event {
            if let Some(index) = selected
                .as_ref()
                .and_then(|event| self.events().iter().position(|known| known == event))
            {
                self.event_cursor = index;
            }
            self.synced_event = selected;
        }

        let report = self.last_report.borrow_mut().take();
        if let Some(report) = report {
            self.status = StatusLine::info(summarize_report(&report));
        }
        if let Some((level, text)) = logger::take_latest() {
            self.status = StatusLine {
                level: Some(level),
                text,
            };
        }
    }
}

fn summarize_report(report: &RunReport) -> String {
    let Some(event) = report.selection.event.as_deref() else {
        return format!("No races found for {}", report.selection.year);
    };
    let failed = report
        .outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, pitwall_core::PanelOutcome::Errored(_)))
        .count();
    if failed == 0 {
        format!("{} {event} loaded", report.selection.year)
    } else {
        format!(
            "{} {event} loaded, {failed} panel(s) failed",
            report.selection.year
        )
    }
}

#[cfg(test)]
mod tests {
    use pitwall_core::{PanelKind, PanelOutcome, Selection};

    use super::*;

    fn report(event: Option<&str>, outcomes: Vec<(PanelKind, PanelOutcome)>) -> RunReport {
        RunReport {
            generation: 1,
            selection: Selection::new("2023", event.map(str::to_string)),
            events: Some(PanelOutcome::Rendered),
            outcomes,
        }
    }

    #[test]
    fn report_summary_counts_failed_panels() {
        let outcomes = vec![
            (PanelKind::Results, PanelOutcome::Rendered),
            (
                PanelKind::TyreStrategy,
                PanelOutcome::Errored(pitwall_core::FailureKind::ApplicationError),
            ),
        ];

        assert_eq!(
            summarize_report(&report(Some("Bahrain Grand Prix"), outcomes)),
            "2023 Bahrain Grand Prix loaded, 1 panel(s) failed"
        );
    }

    #[test]
    fn report_without_an_event_says_the_calendar_is_empty() {
        assert_eq!(
            summarize_report(&report(None, Vec::new())),
            "No races found for 2023"
        );
    }
}
