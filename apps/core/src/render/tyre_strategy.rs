use serde::Serialize;

use super::{Notice, PanelView};
use crate::domain::Compound;
use crate::models::DriverStrategy;

pub const NO_STRATEGY_DATA: &str = "No strategy data for this race";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyChart {
    /// Longest race distance of any driver; every bar is scaled against it.
    pub max_laps: u32,
    pub rows: Vec<StrategyRow>,
    pub legend: [Compound; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRow {
    pub driver: String,
    pub segments: Vec<StintSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintSegment {
    pub compound: Compound,
    /// Compound as the server spelled it, for the tooltip.
    pub label: String,
    pub laps: u32,
    pub width_percent: f64,
}

impl StintSegment {
    pub fn tooltip(&self) -> String {
        format!("{}L ({})", self.laps, self.label)
    }
}

pub fn render(mut drivers: Vec<DriverStrategy>) -> PanelView {
    if drivers.is_empty() {
        return PanelView::Notice(Notice::new(NO_STRATEGY_DATA));
    }
    PanelView::TyreStrategy(chart(&mut drivers))
}

fn chart(drivers: &mut [DriverStrategy]) -> StrategyChart {
    let max_laps = drivers
        .iter()
        .map(DriverStrategy::total_laps)
        .max()
        .unwrap_or(0);

    drivers.sort_by_cached_key(|strategy| strategy.driver.to_lowercase());

    let rows = drivers
        .iter()
        .map(|driver| StrategyRow {
            driver: driver.driver.clone(),
            segments: driver
                .stints
                .iter()
                .map(|stint| StintSegment {
                    compound: stint.compound(),
                    label: stint.compound_label().to_string(),
                    laps: stint.stint_length,
                    width_percent: share_of(stint.stint_length, max_laps),
                })
                .collect(),
        })
        .collect();

    StrategyChart {
        max_laps,
        rows,
        legend: Compound::ALL,
    }
}

fn share_of(laps: u32, max_laps: u32) -> f64 {
    if max_laps == 0 {
        return 0.0;
    }
    f64::from(laps) / f64::from(max_laps) * 100.0
}
