use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(name = "pitwall", version, about = "Race session dashboard")]
pub struct CliArgs {
    /// Load one race, print every panel and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless run as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the dashboard server URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Optional panels to wire in (tyre_strategy,pitstops,track_stats,track_info,replay)
    #[arg(long, value_name = "LIST")]
    pub panels: Option<String>,

    /// Season to open with
    #[arg(long, value_name = "YEAR")]
    pub year: Option<String>,

    /// Race to open with, as named on the calendar
    #[arg(long, value_name = "NAME")]
    pub event: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(server) = &self.server {
            std::env::set_var("PITWALL_SERVER_URL", server);
        }
        if let Some(panels) = &self.panels {
            std::env::set_var("PITWALL_PANELS", panels);
        }
        if let Some(year) = &self.year {
            std::env::set_var("PITWALL_YEAR", year);
        }
        if let Some(event) = &self.event {
            std::env::set_var("PITWALL_EVENT", event);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_headless_race() {
        let args = CliArgs::parse_from([
            "pitwall",
            "--headless",
            "--json",
            "--year",
            "2023",
            "--event",
            "Bahrain Grand Prix",
            "--panels",
            "pitstops,replay",
        ]);

        assert!(args.headless);
        assert!(args.json);
        assert_eq!(args.year.as_deref(), Some("2023"));
        assert_eq!(args.event.as_deref(), Some("Bahrain Grand Prix"));
        assert_eq!(args.panels.as_deref(), Some("pitstops,replay"));
        assert!(args.server.is_none());
    }

    #[test]
    fn help_lists_the_server_flag() {
        assert!(CliArgs::help_text().contains("--server"));
    }
}
