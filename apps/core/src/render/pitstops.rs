use serde::Serialize;

use super::{Notice, PanelView};
use crate::models::{PitstopAnalysis, PitstopRecord};

/// Bars are drawn against this many seconds; slower teams overflow past 100%.
pub const REFERENCE_CEILING_SECS: f64 = 50.0;
pub const RANKED_TEAMS: usize = 5;
pub const NO_PITSTOP_DATA: &str = "No pit stop data for this race";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitstopSummary {
    pub total_pitstops: u32,
    pub ranking: Vec<RankedTeam>,
    pub teammates: Vec<TeammateGap>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeam {
    pub team: String,
    pub total_stops: u32,
    pub avg_time: f64,
    pub bar_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeammateGap {
    pub team: String,
    pub faster_driver: String,
    pub gap_secs: f64,
}

pub fn render(analysis: &PitstopAnalysis) -> PanelView {
    if analysis.teams.is_empty() {
        return PanelView::Notice(Notice::new(NO_PITSTOP_DATA));
    }
    PanelView::Pitstops(summarize(analysis))
}

pub fn summarize(analysis: &PitstopAnalysis) -> PitstopSummary {
    PitstopSummary {
        total_pitstops: analysis.total_pitstops,
        ranking: rank(analysis),
        teammates: analysis
            .teams
            .iter()
            .filter_map(|(team, data)| teammate_gap(team, &data.stops))
            .collect(),
    }
}

fn rank(analysis: &PitstopAnalysis) -> Vec<RankedTeam> {
    let mut teams: Vec<_> = analysis.teams.iter().collect();
    // `sort_by` is stable: equal averages keep document order.
    teams.sort_by(|(_, a), (_, b)| a.avg_time.total_cmp(&b.avg_time));

    teams
        .into_iter()
        .take(RANKED_TEAMS)
        .map(|(team, data)| RankedTeam {
            team: team.clone(),
            total_stops: data.total_stops,
            avg_time: data.avg_time,
            bar_percent: data.avg_time / REFERENCE_CEILING_SECS * 100.0,
        })
        .collect()
}

/// Only teams whose stops involve exactly two drivers get a comparison.
fn teammate_gap(team: &str, stops: &[PitstopRecord]) -> Option<TeammateGap> {
    let mut drivers: Vec<(&str, Vec<f64>)> = Vec::new();
    for stop in stops {
        match drivers.iter_mut().find(|(name, _)| *name == stop.driver) {
            Some((_, times)) => times.push(stop.time),
            None => drivers.push((stop.driver.as_str(), vec![stop.time])),
        }
    }

    let [(first, first_times), (second, second_times)] = drivers.as_slice() else {
        return None;
    };
    let first_avg = mean(first_times);
    let second_avg = mean(second_times);
    let faster_driver = if first_avg < second_avg { first } else { second };

    Some(TeammateGap {
        team: team.to_string(),
        faster_driver: (*faster_driver).to_string(),
        gap_secs: (first_avg - second_avg).abs(),
    })
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamPitstops;

    fn team(name: &str, avg_time: f64, stops: Vec<PitstopRecord>) -> (String, TeamPitstops) {
        (
            name.to_string(),
            TeamPitstops {
                avg_time,
                total_stops: u32::try_from(stops.len()).unwrap_or(0),
                stops,
            },
        )
    }

    fn stop(driver: &str, time: f64) -> PitstopRecord {
        PitstopRecord {
            driver: driver.to_string(),
            time,
            lap: None,
        }
    }

    fn analysis(teams: Vec<(String, TeamPitstops)>) -> PitstopAnalysis {
        PitstopAnalysis {
            total_pitstops: 0,
            teams,
        }
    }

    #[test]
    fn ranks_the_five_fastest_teams_ascending() {
        let summary = summarize(&analysis(vec![
            team("A", 22.1, vec![]),
            team("B", 19.4, vec![]),
            team("C", 25.0, vec![]),
            team("D", 18.0, vec![]),
            team("E", 30.0, vec![]),
            team("F", 21.0, vec![]),
        ]));

        let ranked: Vec<&str> = summary.ranking.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(ranked, ["D", "B", "F", "A", "C"]);
    }

    #[test]
    fn ties_keep_document_order() {
        let summary = summarize(&analysis(vec![
            team("Williams", 20.0, vec![]),
            team("Alpine", 20.0, vec![]),
            team("Haas", 19.0, vec![]),
        ]));

        let ranked: Vec<&str> = summary.ranking.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(ranked, ["Haas", "Williams", "Alpine"]);
    }

    #[test]
    fn bar_is_scaled_to_a_fifty_second_ceiling() {
        let summary = summarize(&analysis(vec![
            team("Slow", 60.0, vec![]),
            team("Quick", 25.0, vec![]),
        ]));

        assert!((summary.ranking[0].bar_percent - 50.0).abs() < 1e-9);
        assert!((summary.ranking[1].bar_percent - 120.0).abs() < 1e-9);
    }

    #[test]
    fn compares_teammates_only_for_two_driver_teams() {
        let summary = summarize(&analysis(vec![
            team(
                "Red Bull",
                22.0,
                vec![stop("VER", 21.0), stop("PER", 23.0), stop("PER", 24.0)],
            ),
            team("Haas", 24.0, vec![stop("MAG", 24.0)]),
            team(
                "Williams",
                25.0,
                vec![stop("ALB", 25.0), stop("SAR", 25.5), stop("DEV", 26.0)],
            ),
        ]));

        assert_eq!(summary.teammates.len(), 1);
        let gap = &summary.teammates[0];
        assert_eq!(gap.team, "Red Bull");
        assert_eq!(gap.faster_driver, "VER");
        assert!((gap.gap_secs - 2.5).abs() < 1e-9);
    }

    #[test]
    fn equal_teammates_name_the_second_driver() {
        let summary = summarize(&analysis(vec![team(
            "McLaren",
            22.0,
            vec![stop("NOR", 22.0), stop("PIA", 22.0)],
        )]));

        assert_eq!(summary.teammates[0].faster_driver, "PIA");
        assert!(summary.teammates[0].gap_secs.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_team_map_is_a_notice() {
        assert_eq!(
            render(&analysis(Vec::new())),
            PanelView::Notice(Notice::new(NO_PITSTOP_DATA))
        );
    }
}
