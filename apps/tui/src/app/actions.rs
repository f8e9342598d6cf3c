// Orchestrator operations triggered from the keyboard. Each runs as a task on
// the current LocalSet; the event loop keeps drawing while it is in flight.

use std::future::Future;
use std::rc::Rc;

use log::{debug, warn};
use pitwall_core::{RunReport, SelectionError};

use super::App;

impl App {
    /// First load: the calendar of the initial season, then the race given on
    /// the command line or the first one on the calendar.
    pub fn start(&mut self) {
        let year = self.year().to_string();
        let event = self.take_initial_event();
        let orchestrator = Rc::clone(&self.orchestrator);
        self.spawn(async move { Ok(orchestrator.initialize(&year, event).await) });
    }

    pub fn change_year(&mut self, step: isize) {
        let Some(index) = self
            .year_index
            .checked_add_signed(step)
            .filter(|index| *index < self.years.len())
        else {
            return;
        };
        if index == self.year_index {
            return;
        }
        self.year_index = index;
        self.event_cursor = 0;

        let year = self.year().to_string();
        self.status.text = format!("Loading the {year} calendar...");
        let orchestrator = Rc::clone(&self.orchestrator);
        self.spawn(async move { orchestrator.select_year(&year).await });
    }

    pub fn move_event_cursor(&mut self, step: isize) {
        let count = self.events().len();
        if count == 0 {
            return;
        }
        self.event_cursor = self
            .event_cursor
            .saturating_add_signed(step)
            .min(count - 1);
    }

    /// Loads the race under the cursor.
    pub fn load_highlighted_event(&mut self) {
        let Some(event) = self.events().get(self.event_cursor).cloned() else {
            return;
        };
        self.status.text = format!("Loading {event}...");
        let orchestrator = Rc::clone(&self.orchestrator);
        self.spawn(async move { orchestrator.select_event(&event).await });
    }

    pub fn refresh(&mut self) {
        self.status.text = "Refreshing...".to_string();
        let orchestrator = Rc::clone(&self.orchestrator);
        self.spawn(async move { Ok(orchestrator.refresh().await) });
    }

    fn spawn<F>(&self, operation: F)
    where
        F: Future<Output = Result<RunReport, SelectionError>> + 'static,
    {
        let in_flight = Rc::clone(&self.in_flight);
        let last_report = Rc::clone(&self.last_report);
        let reported = Rc::clone(&self.reported_generation);
        in_flight.set(in_flight.get() + 1);

        tokio::task::spawn_local(async move {
            match operation.await {
                Ok(report) if report.generation >= reported.get() => {
                    reported.set(report.generation);
                    *last_report.borrow_mut() = Some(report);
                }
                Ok(report) => debug!("Report for generation {} superseded", report.generation),
                Err(err) => warn!("{err}"),
            }
            in_flight.set(in_flight.get().saturating_sub(1));
        });
    }
}
