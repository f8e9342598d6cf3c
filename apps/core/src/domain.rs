use serde::Serialize;

/// The user's current choice of season and race.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub year: String,
    pub event: Option<String>,
}

impl Selection {
    pub fn new(year: impl Into<String>, event: Option<String>) -> Self {
        Self {
            year: year.into(),
            event,
        }
    }

    /// Both parts are present and non-blank, so pipelines may be triggered.
    pub fn is_complete(&self) -> bool {
        !self.year.trim().is_empty()
            && self
                .event
                .as_deref()
                .is_some_and(|event| !event.trim().is_empty())
    }

    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or_default()
    }
}

/// Every dashboard region a pipeline can write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerId {
    EventSelect,
    Results,
    TrackStats,
    TrackMap,
    PositionChart,
    TyreStrategy,
    Pitstops,
    Replay,
}

impl ContainerId {
    pub const ALL: [Self; 8] = [
        Self::EventSelect,
        Self::Results,
        Self::TrackStats,
        Self::TrackMap,
        Self::PositionChart,
        Self::TyreStrategy,
        Self::Pitstops,
        Self::Replay,
    ];

    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::EventSelect => "event-select",
            Self::Results => "results",
            Self::TrackStats => "track-stats",
            Self::TrackMap => "track-visualization",
            Self::PositionChart => "position-chart",
            Self::TyreStrategy => "tyre-strategy-chart",
            Self::Pitstops => "pitstop-chart",
            Self::Replay => "replay",
        }
    }

    pub fn from_dom_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.dom_id() == value)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::EventSelect => "Events",
            Self::Results => "Race Results",
            Self::TrackStats => "Circuit",
            Self::TrackMap => "Track Map",
            Self::PositionChart => "Positions",
            Self::TyreStrategy => "Tyre Strategy",
            Self::Pitstops => "Pit Stops",
            Self::Replay => "Replay",
        }
    }

    /// Size of the loading indicator a panel shows while its data is in flight.
    pub const fn indicator_size(self) -> IndicatorSize {
        match self {
            Self::EventSelect => IndicatorSize::Small,
            Self::TrackMap => IndicatorSize::Large,
            _ => IndicatorSize::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Results,
    Positions,
    TrackStats,
    TrackInfo,
    TyreStrategy,
    Pitstops,
    Replay,
}

impl PanelKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Results => "results",
            Self::Positions => "positions",
            Self::TrackStats => "track_stats",
            Self::TrackInfo => "track_info",
            Self::TyreStrategy => "tyre_strategy",
            Self::Pitstops => "pitstops",
            Self::Replay => "replay",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Results => "race results",
            Self::Positions => "the position chart",
            Self::TrackStats | Self::TrackInfo => "track statistics",
            Self::TyreStrategy => "tyre strategy data",
            Self::Pitstops => "pit stop data",
            Self::Replay => "the race replay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSize {
    Small,
    Normal,
    Large,
}

impl IndicatorSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Normal => "normal",
            Self::Large => "large",
        }
    }
}

/// Tyre rubber class. Anything the palette does not know is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    Unknown,
}

impl Compound {
    /// Legend order.
    pub const ALL: [Self; 6] = [
        Self::Soft,
        Self::Medium,
        Self::Hard,
        Self::Intermediate,
        Self::Wet,
        Self::Unknown,
    ];

    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "SOFT" => Self::Soft,
            "MEDIUM" => Self::Medium,
            "HARD" => Self::Hard,
            "INTERMEDIATE" => Self::Intermediate,
            "WET" => Self::Wet,
            _ => Self::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "SOFT",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
            Self::Intermediate => "INTERMEDIATE",
            Self::Wet => "WET",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Soft => "tyre-soft",
            Self::Medium => "tyre-medium",
            Self::Hard => "tyre-hard",
            Self::Intermediate => "tyre-intermediate",
            Self::Wet => "tyre-wet",
            Self::Unknown => "tyre-unknown",
        }
    }

    pub const fn legend_label(self) -> &'static str {
        match self {
            Self::Intermediate => "INTER",
            other => other.as_str(),
        }
    }
}
