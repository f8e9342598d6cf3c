//! HTML and SVG fragments for surfaces that draw with markup.

use std::fmt::Write as _;

use super::pitstops::PitstopSummary;
use super::replay::ReplayFrame;
use super::track::{
    TrackCard, TrackShape, FALLBACK_ELLIPSE, START_LINE, START_LINE_STROKE, STROKE_WIDTH,
    TRACK_STROKE,
};
use super::tyre_strategy::StrategyChart;
use super::{ErrorPlaceholder, Notice, PanelView};

const NO_DATA: &str = "No data";

impl PanelView {
    /// Markup for the container's new subtree. The position chart has no
    /// markup of its own; its surface hands it to the plotting library.
    pub fn to_html(&self) -> String {
        match self {
            Self::Html(fragment) => fragment.clone(),
            Self::PositionChart(plot) => format!(
                r#"<div class="position-chart-data" data-series="{}"></div>"#,
                plot.data.len()
            ),
            Self::TyreStrategy(chart) => strategy_html(chart),
            Self::Pitstops(summary) => pitstops_html(summary),
            Self::TrackCard(card) => track_card_html(card),
            Self::TrackMap(shape) => shape.svg(),
            Self::Replay(frame) => replay_svg(frame),
            Self::Notice(notice) => notice_html(notice),
            Self::Failure(placeholder) => failure_html(placeholder),
        }
    }
}

impl TrackShape {
    /// Children of the 500x500 track `<svg>`.
    pub fn svg(&self) -> String {
        match self.path_data() {
            Some(data) => format!(
                r#"<path d="{data}" stroke="{TRACK_STROKE}" stroke-width="{STROKE_WIDTH}" fill="none"/>"#
            ),
            None => fallback_svg(),
        }
    }
}

fn fallback_svg() -> String {
    let ellipse = FALLBACK_ELLIPSE;
    let (start, end) = START_LINE;
    format!(
        concat!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" stroke="{}" stroke-width="{}" fill="none"/>"#,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#
        ),
        ellipse.cx,
        ellipse.cy,
        ellipse.rx,
        ellipse.ry,
        TRACK_STROKE,
        STROKE_WIDTH,
        start.x,
        start.y,
        end.x,
        end.y,
        START_LINE_STROKE,
        STROKE_WIDTH,
    )
}

fn strategy_html(chart: &StrategyChart) -> String {
    let mut html = String::from(r#"<div class="tyre-strategy-container">"#);
    for row in &chart.rows {
        let _ = write!(
            html,
            r#"<div class="tyre-bar"><div class="tyre-driver">{}</div><div class="tyre-stints">"#,
            escape(&row.driver)
        );
        for segment in &row.segments {
            let _ = write!(
                html,
                r#"<div class="tyre-stint {}" style="width: {:.2}%" title="{}">{}</div>"#,
                segment.compound.css_class(),
                segment.width_percent,
                escape(&segment.tooltip()),
                segment.laps
            );
        }
        html.push_str("</div></div>");
    }

    html.push_str(r#"<div class="tyre-legend">"#);
    for compound in chart.legend {
        let _ = write!(
            html,
            r#"<div class="tyre-legend-item"><div class="tyre-legend-color {}"></div><span class="tyre-legend-label">{}</span></div>"#,
            compound.css_class(),
            compound.legend_label()
        );
    }
    html.push_str("</div></div>");
    html
}

fn pitstops_html(summary: &PitstopSummary) -> String {
    let mut html = format!(
        concat!(
            r#"<div class="pitstop-analysis-container"><div class="pitstop-summary">"#,
            r#"<div class="summary-item"><div class="summary-label">Total pit stops</div>"#,
            r#"<div class="summary-value">{}</div></div></div>"#,
            r#"<div class="team-analysis"><h5>Fastest teams (total pit lane time)</h5>"#
        ),
        summary.total_pitstops
    );

    for team in &summary.ranking {
        let _ = write!(
            html,
            concat!(
                r#"<div class="team-row"><div class="team-name">{}</div>"#,
                r#"<div class="team-stats"><span class="pitstop-count">{} stops</span>"#,
                r#"<span class="avg-time">{:.2} s</span></div>"#,
                r#"<div class="time-bar-container"><div class="time-bar" style="width: {:.2}%"></div></div></div>"#
            ),
            escape(&team.team),
            team.total_stops,
            team.avg_time,
            team.bar_percent
        );
    }
    html.push_str("</div>");

    html.push_str(r#"<div class="teammate-comparison"><h5>Teammate comparison</h5>"#);
    for gap in &summary.teammates {
        let _ = write!(
            html,
            concat!(
                r#"<div class="teammate-row"><div class="team-name-small">{}</div>"#,
                r#"<div class="teammate-info"><span class="driver-faster">{}</span>"#,
                r#"<span class="time-diff">faster by {:.2}s</span></div></div>"#
            ),
            escape(&gap.team),
            escape(&gap.faster_driver),
            gap.gap_secs
        );
    }
    html.push_str("</div></div>");
    html
}

fn track_card_html(card: &TrackCard) -> String {
    if card.unavailable {
        return format!(
            concat!(
                r#"<div class="track-stats-card"><div class="track-header"><h3>{}</h3>"#,
                r#"<div class="track-location"><span>Data not loaded</span></div></div>"#,
                r#"<div class="stats-error"><p>Could not load track statistics.</p>"#,
                r#"<p>Try selecting another race.</p></div></div>"#
            ),
            escape(&card.title)
        );
    }

    let mut html = format!(
        concat!(
            r#"<div class="track-stats-card"><div class="track-header"><h3>{}</h3>"#,
            r#"<div class="track-location"><span>{}, {}</span></div></div>"#,
            r#"<div class="stats-grid">"#
        ),
        escape(&card.title),
        escape(or_no_data(card.location.as_deref())),
        escape(or_no_data(card.country.as_deref()))
    );
    stat_item(&mut html, "Circuit length", card.circuit_length.as_deref());
    stat_item(&mut html, "Turns", card.turns_count.as_deref());
    if card.lap_record.is_some() {
        stat_item(&mut html, "Lap record", card.lap_record.as_deref());
    }
    html.push_str("</div></div>");
    html
}

fn stat_item(html: &mut String, label: &str, value: Option<&str>) {
    let _ = write!(
        html,
        r#"<div class="stat-item"><div class="stat-content"><div class="stat-label">{}</div><div class="stat-value">{}</div></div></div>"#,
        label,
        escape(or_no_data(value))
    );
}

fn replay_svg(frame: &ReplayFrame) -> String {
    let mut svg = fallback_svg();
    for car in &frame.cars {
        let _ = write!(
            svg,
            r#"<circle class="replay-car" cx="{:.1}" cy="{:.1}" r="6" fill="{}"><title>{}</title></circle>"#,
            car.position.x,
            car.position.y,
            escape(&car.color),
            escape(&car.name)
        );
    }
    svg
}

fn notice_html(notice: &Notice) -> String {
    format!(r#"<p class="panel-notice">{}</p>"#, escape(&notice.message))
}

fn failure_html(placeholder: &ErrorPlaceholder) -> String {
    format!(
        concat!(
            r#"<div class="panel-error"><h4>{}</h4>"#,
            r#"<p class="panel-error-message">{}</p>"#,
            r#"<p class="panel-error-hint">{}</p></div>"#
        ),
        escape(&placeholder.title),
        escape(&placeholder.message),
        placeholder.hint
    )
}

fn or_no_data(value: Option<&str>) -> &str {
    value.unwrap_or(NO_DATA)
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
