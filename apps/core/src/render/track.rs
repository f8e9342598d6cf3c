use std::fmt::Write as _;

use serde::Serialize;

use crate::models::{LapRecord, StatValue, TrackCoordinate, TrackInfo, TrackStats};

pub const TRACK_STROKE: &str = "#e10600";
pub const START_LINE_STROKE: &str = "#fff";
pub const STROKE_WIDTH: u8 = 3;

/// The placeholder circuit drawn whenever real geometry is missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Ellipse {
    /// Point on the outline at `angle` radians.
    pub fn point_at(self, angle: f64) -> TrackCoordinate {
        TrackCoordinate::new(
            self.rx.mul_add(angle.cos(), self.cx),
            self.ry.mul_add(angle.sin(), self.cy),
        )
    }
}

pub const FALLBACK_ELLIPSE: Ellipse = Ellipse {
    cx: 250.0,
    cy: 250.0,
    rx: 180.0,
    ry: 80.0,
};

pub const START_LINE: (TrackCoordinate, TrackCoordinate) = (
    TrackCoordinate::new(250.0, 170.0),
    TrackCoordinate::new(250.0, 190.0),
);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TrackShape {
    /// Connected line through the points in order, first point as the start.
    Path { points: Vec<TrackCoordinate> },
    Fallback,
}

impl TrackShape {
    /// SVG `d` attribute for a path, `None` for the fallback.
    pub fn path_data(&self) -> Option<String> {
        let Self::Path { points } = self else {
            return None;
        };
        let mut data = String::new();
        for (index, point) in points.iter().enumerate() {
            let command = if index == 0 { "M" } else { " L" };
            let _ = write!(data, "{command} {} {}", point.x, point.y);
        }
        Some(data)
    }
}

pub fn shape(coordinates: &[TrackCoordinate]) -> TrackShape {
    if coordinates.len() < 2 {
        return TrackShape::Fallback;
    }
    TrackShape::Path {
        points: coordinates.to_vec(),
    }
}

/// Circuit facts for the stats panel. Missing values stay `None` and are
/// rendered as "No data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackCard {
    pub title: String,
    pub location: Option<String>,
    pub country: Option<String>,
    pub circuit_length: Option<String>,
    pub turns_count: Option<String>,
    pub lap_record: Option<String>,
    /// Set when the stats could not be fetched; only the title is known.
    pub unavailable: bool,
}

pub const DEFAULT_TRACK_TITLE: &str = "Circuit";

pub fn stats_card(stats: &TrackStats) -> TrackCard {
    let info = stats.track_info.clone().unwrap_or_default();
    TrackCard {
        title: info
            .name
            .or(info.event_name)
            .unwrap_or_else(|| DEFAULT_TRACK_TITLE.to_string()),
        location: info.location,
        country: info.country,
        circuit_length: present(stats.circuit_length.as_ref()),
        turns_count: present(stats.turns_count.as_ref()),
        lap_record: stats.lap_record.as_ref().and_then(lap_record_text),
        unavailable: false,
    }
}

pub fn info_card(info: &TrackInfo) -> TrackCard {
    TrackCard {
        title: info
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_TRACK_TITLE.to_string()),
        location: info.location.clone(),
        country: info.country.clone(),
        circuit_length: present(info.circuit_length.as_ref()),
        turns_count: present(info.turns_count.as_ref()),
        lap_record: info.lap_record.as_ref().and_then(lap_record_text),
        unavailable: false,
    }
}

/// Static per-event card for when the stats are unreachable or the panel is
/// not wired in.
pub fn unavailable_card(event: &str) -> TrackCard {
    TrackCard {
        title: event.to_string(),
        unavailable: true,
        ..TrackCard::default()
    }
}

/// Zero and empty values count as missing.
fn present(value: Option<&StatValue>) -> Option<String> {
    match value? {
        StatValue::Number(number) if *number == 0.0 => None,
        StatValue::Text(text) if text.trim().is_empty() => None,
        other => Some(other.to_string()),
    }
}

fn lap_record_text(record: &LapRecord) -> Option<String> {
    let time = present(record.time.as_ref());
    if time.is_none() && record.driver.is_none() {
        return None;
    }
    Some(format!(
        "{} ({})",
        time.as_deref().unwrap_or("No data"),
        record.driver.as_deref().unwrap_or("?")
    ))
}
