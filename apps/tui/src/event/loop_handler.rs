use std::collections::BTreeMap;
use std::io::Stdout;
use std::rc::Rc;

use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use pitwall_core::{
    Backend, ContainerId, MemorySurface, Orchestrator, PanelView, RunReport,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;

use pitwall_tui::summary::describe;
use pitwall_tui::DashboardConfig;

use crate::app::{handle_input, App};
use crate::ui;

/// Loads one race to completion and prints every panel (no UI).
pub async fn run_headless(
    config: &DashboardConfig,
    backend: Rc<dyn Backend>,
    json: bool,
) -> Result<()> {
    let surface = Rc::new(MemorySurface::new());
    let orchestrator = Orchestrator::builder(backend, surface.clone())
        .with_capabilities(&config.capabilities)
        .build()?;

    let report = orchestrator
        .initialize(&config.initial_year(), config.event.clone())
        .await;
    let run = HeadlessRun::collect(report, orchestrator.events(), &surface);

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        render_headless_text(&run);
    }
    Ok(())
}

#[derive(Serialize)]
struct HeadlessRun {
    report: RunReport,
    events: Vec<String>,
    panels: BTreeMap<ContainerId, PanelView>,
}

impl HeadlessRun {
    fn collect(report: RunReport, events: Vec<String>, surface: &MemorySurface) -> Self {
        let panels = surface
            .snapshot()
            .into_iter()
            .filter_map(|(id, state)| state.view.map(|view| (id, view)))
            .collect();
        Self {
            report,
            events,
            panels,
        }
    }
}

fn render_headless_text(run: &HeadlessRun) {
    let selection = &run.report.selection;
    println!("\n{} {}", selection.year, selection.event_name());
    println!("{}", "=".repeat(selection.year.len() + selection.event_name().len() + 1));

    if run.events.is_empty() {
        println!("No races found for {}", selection.year);
        return;
    }

    for (id, view) in &run.panels {
        println!("\n{}:", id.title());
        for line in describe(view) {
            println!("- {line}");
        }
    }
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    app.start();

    loop {
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(_) | Err(_) => {}
            }
        }

        // Let the orchestrator tasks on this LocalSet make progress
        tokio::task::yield_now().await;
    }
    Ok(())
}
