use log::warn;
use serde::Serialize;

use crate::models::DriverPositions;

/// Position 1 at the top, room for a full 20-car grid, whatever the field size.
pub const Y_AXIS_RANGE: [f64; 2] = [20.5, 0.5];
pub const Y_AXIS_TICK: f64 = 1.0;
const LINE_WIDTH: u8 = 2;
const PLOT_HEIGHT: u32 = 500;

/// Data and layout in the shape the plotting library expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionPlot {
    pub data: Vec<PositionTrace>,
    pub layout: PlotLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<Option<u32>>,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub line: LineStyle,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub dash: String,
    pub width: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotLayout {
    pub xaxis: PlotAxis,
    pub yaxis: PlotAxis,
    pub hovermode: &'static str,
    pub height: u32,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotAxis {
    pub title: AxisTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<bool>,
    pub showgrid: bool,
    pub zeroline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: &'static str,
}

/// Display options for the plot call, separate from the data contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub responsive: bool,
    pub display_mode_bar: bool,
    pub displaylogo: bool,
    pub mode_bar_buttons_to_remove: [&'static str; 3],
    pub scroll_zoom: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            display_mode_bar: true,
            displaylogo: false,
            mode_bar_buttons_to_remove: ["pan2d", "lasso2d", "select2d"],
            scroll_zoom: false,
        }
    }
}

impl PlotLayout {
    fn race_positions() -> Self {
        Self {
            xaxis: PlotAxis {
                title: AxisTitle { text: "Lap" },
                range: None,
                dtick: None,
                autorange: None,
                showgrid: true,
                zeroline: false,
            },
            yaxis: PlotAxis {
                title: AxisTitle { text: "Position" },
                range: Some(Y_AXIS_RANGE),
                dtick: Some(Y_AXIS_TICK),
                autorange: Some(false),
                showgrid: true,
                zeroline: false,
            },
            hovermode: "closest",
            height: PLOT_HEIGHT,
            showlegend: true,
        }
    }
}

/// One line series per driver. `None` for an empty field: there is nothing
/// to plot and the container is left alone.
pub fn render(drivers: &[DriverPositions]) -> Option<PositionPlot> {
    if drivers.is_empty() {
        warn!("No position data to plot");
        return None;
    }

    let data = drivers
        .iter()
        .map(|driver| PositionTrace {
            name: driver.name.clone(),
            x: driver.laps.clone(),
            y: driver.positions.clone(),
            mode: "lines",
            trace_type: "scatter",
            line: LineStyle {
                color: driver.color.clone(),
                dash: driver
                    .dash
                    .clone()
                    .unwrap_or_else(|| "solid".to_string()),
                width: LINE_WIDTH,
            },
            hovertemplate: "<b>%{fullData.name}</b><br>Lap: %{x}<br>Position: %{y}<br><extra></extra>",
        })
        .collect();

    Some(PositionPlot {
        data,
        layout: PlotLayout::race_positions(),
    })
}
