//! Plain-text readings of panel views, for headless output and for the parts
//! of the terminal UI that draw text.

use pitwall_core::render::track::DEFAULT_TRACK_TITLE;
use pitwall_core::render::{PitstopSummary, PositionPlot, StrategyChart, TrackCard, TrackShape};
use pitwall_core::PanelView;

const NO_DATA: &str = "No data";

/// Table cells of a server-rendered fragment, one vector per `<tr>`.
/// Tags inside a cell are dropped and common entities decoded.
pub fn html_rows(fragment: &str) -> Vec<Vec<String>> {
    let lower = fragment.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut cursor = 0;

    while let Some(start) = lower[cursor..].find("<tr").map(|at| at + cursor) {
        let end = lower[start..]
            .find("</tr>")
            .map_or(fragment.len(), |at| at + start);
        let cells = cells(&fragment[start..end], &lower[start..end]);
        if !cells.is_empty() {
            rows.push(cells);
        }
        cursor = end;
        if cursor >= fragment.len() {
            break;
        }
        cursor += "</tr>".len().min(fragment.len() - cursor);
    }
    rows
}

fn cells(row: &str, lower: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut cursor = 0;
    loop {
        let next = ["<td", "<th"]
            .iter()
            .filter_map(|tag| lower[cursor..].find(tag).map(|at| at + cursor))
            .min();
        let Some(open) = next else {
            break;
        };
        let Some(content_start) = lower[open..].find('>').map(|at| at + open + 1) else {
            break;
        };
        let content_end = ["</td", "</th", "<td", "<th"]
            .iter()
            .filter_map(|tag| lower[content_start..].find(tag).map(|at| at + content_start))
            .min()
            .unwrap_or(row.len());
        found.push(strip_tags(&row[content_start..content_end]));
        cursor = content_end;
    }
    found
}

/// Text content of an HTML snippet with whitespace collapsed.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lines describing a view, without styling.
pub fn describe(view: &PanelView) -> Vec<String> {
    match view {
        PanelView::Html(fragment) => {
            let rows = html_rows(fragment);
            if rows.is_empty() {
                vec![strip_tags(fragment)]
            } else {
                rows.iter().map(|row| row.join(" | ")).collect()
            }
        }
        PanelView::PositionChart(plot) => describe_positions(plot),
        PanelView::TyreStrategy(chart) => describe_strategy(chart),
        PanelView::Pitstops(summary) => describe_pitstops(summary),
        PanelView::TrackCard(card) => describe_track_card(card),
        PanelView::TrackMap(TrackShape::Path { points }) => {
            vec![format!("Circuit outline, {} points", points.len())]
        }
        PanelView::TrackMap(TrackShape::Fallback) => vec!["Circuit outline unavailable".to_string()],
        PanelView::Replay(frame) => frame
            .cars
            .iter()
            .map(|car| {
                format!(
                    "{} at ({:.0}, {:.0})",
                    car.name, car.position.x, car.position.y
                )
            })
            .collect(),
        PanelView::Notice(notice) => vec![notice.message.clone()],
        PanelView::Failure(placeholder) => vec![
            placeholder.title.clone(),
            placeholder.message.clone(),
            placeholder.hint.to_string(),
        ],
    }
}

fn describe_positions(plot: &PositionPlot) -> Vec<String> {
    plot.data
        .iter()
        .map(|trace| {
            let last = trace
                .y
                .iter()
                .rev()
                .find_map(|position| *position)
                .map_or_else(|| "-".to_string(), |position| format!("P{position}"));
            format!("{}: {} laps, last {last}", trace.name, trace.x.len())
        })
        .collect()
}

fn describe_strategy(chart: &StrategyChart) -> Vec<String> {
    chart
        .rows
        .iter()
        .map(|row| {
            let stints: Vec<String> = row.segments.iter().map(|segment| segment.tooltip()).collect();
            format!("{}: {}", row.driver, stints.join(", "))
        })
        .collect()
}

fn describe_pitstops(summary: &PitstopSummary) -> Vec<String> {
    let mut lines = vec![format!("Total pit stops: {}", summary.total_pitstops)];
    lines.extend(summary.ranking.iter().enumerate().map(|(rank, team)| {
        format!(
            "{}. {} {:.2}s ({} stops)",
            rank + 1,
            team.team,
            team.avg_time,
            team.total_stops
        )
    }));
    lines.extend(summary.teammates.iter().map(|gap| {
        format!(
            "{}: {} faster by {:.2}s",
            gap.team, gap.faster_driver, gap.gap_secs
        )
    }));
    lines
}

fn describe_track_card(card: &TrackCard) -> Vec<String> {
    let title = if card.title.is_empty() {
        DEFAULT_TRACK_TITLE
    } else {
        card.title.as_str()
    };
    let mut lines = vec![title.to_string()];
    if card.unavailable {
        lines.push("Track statistics unavailable".to_string());
        return lines;
    }
    let place: Vec<&str> = [card.location.as_deref(), card.country.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        lines.push(place.join(", "));
    }
    let fields = [
        ("Length", &card.circuit_length),
        ("Turns", &card.turns_count),
        ("Lap record", &card.lap_record),
    ];
    for (label, value) in fields {
        lines.push(format!("{label}: {}", value.as_deref().unwrap_or(NO_DATA)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use pitwall_core::render::placeholder::ErrorPlaceholder;
    use pitwall_core::render::Notice;
    use pitwall_core::PanelKind;

    use super::*;

    #[test]
    fn reads_rows_out_of_a_results_fragment() {
        let fragment = r#"<table class="results-table">
            <thead><tr><th>Pos</th><th>Driver</th><th>Team</th></tr></thead>
            <tbody>
              <tr><td>1</td><td><span class="driver">Max Verstappen</span></td><td>Red Bull Racing</td></tr>
              <TR><TD>2</TD><TD>Sergio P&eacute;rez</TD><TD>Red Bull &amp; Co</TD></TR>
            </tbody>
        </table>"#;

        let rows = html_rows(fragment);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Pos", "Driver", "Team"]);
        assert_eq!(rows[1], vec!["1", "Max Verstappen", "Red Bull Racing"]);
        assert_eq!(rows[2][2], "Red Bull & Co");
    }

    #[test]
    fn fragment_without_a_table_reads_as_text() {
        let view = PanelView::Html("<p>No results <b>yet</b></p>".to_string());

        assert_eq!(describe(&view), vec!["No results yet"]);
    }

    #[test]
    fn failure_reads_title_message_and_hint() {
        let view = PanelView::Failure(ErrorPlaceholder::for_panel(PanelKind::Pitstops));

        let lines = describe(&view);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Could not load pit stop data");
        assert_eq!(lines[2], "Try selecting another race");
    }

    #[test]
    fn notice_is_its_message() {
        let view = PanelView::Notice(Notice::new("No tyre strategy data"));

        assert_eq!(describe(&view), vec!["No tyre strategy data"]);
    }

    #[test]
    fn unavailable_track_card_says_so() {
        let card = TrackCard {
            title: "Bahrain Grand Prix".to_string(),
            unavailable: true,
            ..TrackCard::default()
        };

        assert_eq!(
            describe(&PanelView::TrackCard(card)),
            vec!["Bahrain Grand Prix", "Track statistics unavailable"]
        );
    }
}
