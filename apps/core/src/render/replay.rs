use serde::Serialize;

use super::track::FALLBACK_ELLIPSE;
use super::{Notice, PanelView};
use crate::models::{ReplayCar, TrackCoordinate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayFrame {
    pub cars: Vec<CarMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarMarker {
    pub name: String,
    pub color: String,
    pub position: TrackCoordinate,
}

/// Places every car on the placeholder circuit at its lap angle.
pub fn render(cars: &[ReplayCar]) -> PanelView {
    if cars.is_empty() {
        return PanelView::Notice(Notice::new("No replay data for this race"));
    }

    PanelView::Replay(ReplayFrame {
        cars: cars
            .iter()
            .map(|car| CarMarker {
                name: car.name.clone(),
                color: car.color.clone(),
                position: FALLBACK_ELLIPSE.point_at(car.angle),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn cars_sit_on_the_circuit_outline() {
        let view = render(&[ReplayCar {
            name: "LEC".to_string(),
            angle: FRAC_PI_2,
            color: "#E8002D".to_string(),
        }]);

        let PanelView::Replay(frame) = view else {
            panic!("expected a replay frame");
        };
        let marker = &frame.cars[0];
        assert!((marker.position.x - 250.0).abs() < 1e-9);
        assert!((marker.position.y - 330.0).abs() < 1e-9);
    }
}
