//! Keeps the latest log line for the footer so nothing is printed over the
//! alternate screen.

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

static LATEST: Mutex<Option<(Level, String)>> = Mutex::new(None);
static LOGGER: StatusLineLogger = StatusLineLogger;

struct StatusLineLogger;

impl Log for StatusLineLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut latest) = LATEST.lock() {
            *latest = Some((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Installs the status-line logger. Warnings and errors only, unless `debug`.
pub fn init(debug: bool) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    Ok(())
}

/// Takes the line logged since the last call, if any.
pub fn take_latest() -> Option<(Level, String)> {
    LATEST.lock().ok().and_then(|mut latest| latest.take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_record() {
        log::set_max_level(LevelFilter::Warn);
        LOGGER.log(
            &Record::builder()
                .level(Level::Error)
                .args(format_args!("Could not load race results"))
                .build(),
        );
        LOGGER.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("No position data"))
                .build(),
        );
        LOGGER.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("GET /events"))
                .build(),
        );

        assert_eq!(
            take_latest(),
            Some((Level::Warn, "No position data".to_string()))
        );
        assert_eq!(take_latest(), None);
    }
}
