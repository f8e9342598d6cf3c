mod app;
mod event;
mod terminal;
mod ui;

use std::rc::Rc;

use app::App;
use clap::Parser;
use color_eyre::Result;
use pitwall_tui::cli::CliArgs;
use pitwall_tui::{logger, DashboardConfig, HttpBackend};
use tokio::task::LocalSet;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = DashboardConfig::load()?;

    let backend = Rc::new(HttpBackend::new(&config.server_url, config.timeout)?);

    // Orchestrator tasks hold `Rc`s, so everything runs on one thread
    let local = LocalSet::new();

    // Check if we're running in a terminal
    if args.headless || !is_terminal() {
        init_console_logging(config.debug);
        return local
            .run_until(event::run_headless(&config, backend, args.json))
            .await;
    }

    if let Err(e) = logger::init(config.debug) {
        eprintln!("Status line logging unavailable: {e}");
    }

    let mut app = App::new(&config, backend)?;

    // Setup terminal
    let mut terminal = terminal::setup()?;

    // Run the application
    let result = local.run_until(event::run(&mut terminal, &mut app)).await;

    // Restore terminal
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn init_console_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    colog::default_builder().filter_level(level).init();
}
