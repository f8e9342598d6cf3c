// Response payloads, one fresh value per request. Nothing here is mutated
// after decoding; each value flows once through a renderer and is dropped.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::domain::Compound;

const DEFAULT_TRACE_COLOR: &str = "#CCCCCC";

fn default_trace_color() -> String {
    DEFAULT_TRACE_COLOR.to_string()
}

/// One driver's lap-by-lap classification from `/positions`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverPositions {
    pub name: String,
    #[serde(default)]
    pub laps: Vec<f64>,
    /// Laps without a classification come through as `null`.
    #[serde(default)]
    pub positions: Vec<Option<u32>>,
    #[serde(default = "default_trace_color")]
    pub color: String,
    #[serde(default)]
    pub dash: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrategyStint {
    #[serde(default)]
    pub compound: Option<String>,
    pub stint_length: u32,
    #[serde(default)]
    pub start_lap: Option<f64>,
    #[serde(default)]
    pub end_lap: Option<f64>,
}

impl StrategyStint {
    pub fn compound(&self) -> Compound {
        self.compound.as_deref().map_or(Compound::Unknown, Compound::parse)
    }

    /// The compound as the server named it, for tooltips.
    pub fn compound_label(&self) -> &str {
        self.compound
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(Compound::Unknown.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverStrategy {
    pub driver: String,
    #[serde(default)]
    pub stints: Vec<StrategyStint>,
}

impl DriverStrategy {
    pub fn total_laps(&self) -> u32 {
        self.stints
            .iter()
            .fold(0, |total, stint| total.saturating_add(stint.stint_length))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PitstopRecord {
    pub driver: String,
    pub time: f64,
    #[serde(default)]
    pub lap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamPitstops {
    #[serde(default)]
    pub avg_time: f64,
    #[serde(default)]
    pub total_stops: u32,
    #[serde(default)]
    pub stops: Vec<PitstopRecord>,
}

/// `/pitstop_analysis`. Teams keep the order the server wrote them in, which
/// is the tie-break order of the ranking.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PitstopAnalysis {
    #[serde(default)]
    pub total_pitstops: u32,
    #[serde(default, deserialize_with = "ordered_teams")]
    pub teams: Vec<(String, TeamPitstops)>,
}

fn ordered_teams<'de, D>(deserializer: D) -> Result<Vec<(String, TeamPitstops)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedTeams;

    impl<'de> Visitor<'de> for OrderedTeams {
        type Value = Vec<(String, TeamPitstops)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of team name to pit stop summary")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut teams = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, TeamPitstops>()? {
                teams.push(entry);
            }
            Ok(teams)
        }
    }

    deserializer.deserialize_map(OrderedTeams)
}

/// Point in SVG viewport units on a 500x500 canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackCoordinate {
    pub x: f64,
    pub y: f64,
}

impl TrackCoordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The server sends circuit facts either preformatted or as bare numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) if value.fract() == 0.0 => write!(f, "{value:.0}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LapRecord {
    #[serde(default)]
    pub time: Option<StatValue>,
    #[serde(default)]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
}

/// `/track_stats`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackStats {
    #[serde(default)]
    pub track_info: Option<TrackSummary>,
    #[serde(default)]
    pub circuit_length: Option<StatValue>,
    #[serde(default)]
    pub turns_count: Option<StatValue>,
    #[serde(default)]
    pub coordinates: Vec<TrackCoordinate>,
    #[serde(default)]
    pub lap_record: Option<LapRecord>,
}

/// `/track_info`, the older single-card track panel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lap_record: Option<LapRecord>,
    #[serde(default)]
    pub circuit_length: Option<StatValue>,
    #[serde(default)]
    pub turns_count: Option<StatValue>,
    #[serde(default)]
    pub coordinates: Vec<TrackCoordinate>,
}

/// `/replay`: a car's position around the lap as an angle in radians.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayCar {
    pub name: String,
    pub angle: f64,
    #[serde(default = "default_trace_color")]
    pub color: String,
}
