//! Native drawing of each panel view inside its container block.

use std::f64::consts::TAU;

use pitwall_core::models::TrackCoordinate;
use pitwall_core::render::track::{FALLBACK_ELLIPSE, START_LINE};
use pitwall_core::render::{
    ErrorPlaceholder, Notice, PitstopSummary, PositionPlot, ReplayFrame, StrategyChart, TrackCard,
    TrackShape,
};
use pitwall_core::{ContainerId, PanelView};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, Paragraph, Row, Table, Wrap,
};
use ratatui::Frame;

use pitwall_tui::summary::{describe, html_rows, strip_tags};

use super::palette::{compound_color, hex_color, ACCENT, FAILURE, MUTED};

/// Positions run P1..P20; the chart's y axis grows upwards so P1 is drawn at
/// the top by flipping around this value.
const POSITION_FLIP: f64 = 21.0;
const DRIVER_COLUMN: u16 = 5;
const ELLIPSE_SEGMENTS: u32 = 72;

pub fn render_view(f: &mut Frame<'_>, area: Rect, id: ContainerId, view: &PanelView) {
    match view {
        PanelView::Html(fragment) if id == ContainerId::Results => {
            render_results(f, area, fragment);
        }
        PanelView::PositionChart(plot) => render_positions(f, area, plot),
        PanelView::TyreStrategy(chart) => render_strategy(f, area, chart),
        PanelView::Pitstops(summary) => render_pitstops(f, area, summary),
        PanelView::TrackCard(card) => render_track_card(f, area, card),
        PanelView::TrackMap(shape) => render_track(f, area, shape),
        PanelView::Replay(frame) => render_replay(f, area, frame),
        PanelView::Notice(notice) => render_notice(f, area, notice),
        PanelView::Failure(placeholder) => render_failure(f, area, placeholder),
        PanelView::Html(_) => {
            let lines: Vec<TextLine<'_>> = describe(view).into_iter().map(TextLine::from).collect();
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
        }
    }
}

fn render_results(f: &mut Frame<'_>, area: Rect, fragment: &str) {
    let mut rows = html_rows(fragment);
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new(strip_tags(fragment)).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(1);
    let header = fragment
        .to_ascii_lowercase()
        .contains("<th")
        .then(|| rows.remove(0));
    let mut widths = vec![Constraint::Fill(1); columns];
    if let Some(first) = widths.first_mut() {
        *first = Constraint::Length(4);
    }

    let body: Vec<Row<'_>> = rows.into_iter().map(Row::new).collect();
    let mut table = Table::new(body, widths).column_spacing(1);
    if let Some(header) = header {
        table = table.header(
            Row::new(header).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }
    f.render_widget(table, area);
}

fn render_positions(f: &mut Frame<'_>, area: Rect, plot: &PositionPlot) {
    let series: Vec<(Color, Marker, &str, Vec<(f64, f64)>)> = plot
        .data
        .iter()
        .map(|trace| {
            let points = trace
                .x
                .iter()
                .zip(&trace.y)
                .filter_map(|(lap, position)| {
                    position.map(|position| (*lap, POSITION_FLIP - f64::from(position)))
                })
                .collect();
            let marker = if trace.line.dash == "solid" {
                Marker::Braille
            } else {
                Marker::Dot
            };
            (
                hex_color(&trace.line.color).unwrap_or(MUTED),
                marker,
                trace.name.as_str(),
                points,
            )
        })
        .collect();
    let last_lap = plot
        .data
        .iter()
        .flat_map(|trace| trace.x.iter().copied())
        .fold(1.0, f64::max);

    let datasets = series
        .iter()
        .map(|(color, marker, name, points)| {
            Dataset::default()
                .name(*name)
                .marker(*marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .legend_position(None)
        .x_axis(
            Axis::default()
                .title("Lap")
                .style(Style::default().fg(MUTED))
                .bounds([1.0, last_lap])
                .labels(vec![Span::raw("1"), Span::raw(format!("{last_lap:.0}"))]),
        )
        .y_axis(
            Axis::default()
                .title("Pos")
                .style(Style::default().fg(MUTED))
                .bounds([0.5, POSITION_FLIP - 0.5])
                .labels(vec![Span::raw("P20"), Span::raw("P10"), Span::raw("P1")]),
        );
    f.render_widget(chart, area);
}

fn render_strategy(f: &mut Frame<'_>, area: Rect, chart: &StrategyChart) {
    let bar_width = area.width.saturating_sub(DRIVER_COLUMN);
    let mut lines: Vec<TextLine<'_>> = chart
        .rows
        .iter()
        .map(|row| {
            let mut spans = vec![Span::styled(
                format!("{:<width$}", row.driver, width = usize::from(DRIVER_COLUMN)),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            spans.extend(row.segments.iter().map(|segment| {
                Span::styled(
                    "█".repeat(segment_cells(segment.width_percent, bar_width)),
                    Style::default().fg(compound_color(segment.compound)),
                )
            }));
            TextLine::from(spans)
        })
        .collect();

    lines.push(TextLine::default());
    lines.push(TextLine::from(
        chart
            .legend
            .iter()
            .flat_map(|compound| {
                [
                    Span::styled("■ ", Style::default().fg(compound_color(*compound))),
                    Span::styled(
                        format!("{}  ", compound.legend_label()),
                        Style::default().fg(MUTED),
                    ),
                ]
            })
            .collect::<Vec<_>>(),
    ));
    f.render_widget(Paragraph::new(lines), area);
}

/// Terminal cells for a segment that takes `width_percent` of the bar.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn segment_cells(width_percent: f64, bar_width: u16) -> usize {
    (width_percent / 100.0 * f64::from(bar_width)).round().max(0.0) as usize
}

fn render_pitstops(f: &mut Frame<'_>, area: Rect, summary: &PitstopSummary) {
    let notes_height = u16::try_from(summary.teammates.len() + 1).unwrap_or(u16::MAX);
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(notes_height)])
        .split(area);

    let bars: Vec<Bar<'_>> = summary
        .ranking
        .iter()
        .map(|team| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = (team.bar_percent * 10.0).round().max(0.0) as u64;
            Bar::default()
                .value(value)
                .label(TextLine::from(team.team.as_str()))
                .text_value(format!("{:.2}s", team.avg_time))
                .style(Style::default().fg(ACCENT))
                .value_style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();
    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .max(1000)
        .bar_width(1)
        .bar_gap(0);
    f.render_widget(chart, split[0]);

    let mut notes = vec![TextLine::from(vec![
        Span::styled("Total pit stops: ", Style::default().fg(MUTED)),
        Span::raw(summary.total_pitstops.to_string()),
    ])];
    notes.extend(summary.teammates.iter().map(|gap| {
        TextLine::from(vec![
            Span::styled(format!("{}: ", gap.team), Style::default().fg(MUTED)),
            Span::raw(format!(
                "{} faster by {:.2}s",
                gap.faster_driver, gap.gap_secs
            )),
        ])
    }));
    f.render_widget(Paragraph::new(notes), split[1]);
}

fn render_track_card(f: &mut Frame<'_>, area: Rect, card: &TrackCard) {
    let mut lines = vec![TextLine::from(Span::styled(
        card.title.clone(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))];
    if card.unavailable {
        lines.push(TextLine::from(Span::styled(
            "Track statistics unavailable",
            Style::default().fg(MUTED),
        )));
    } else {
        lines.extend(
            describe(&PanelView::TrackCard(card.clone()))
                .into_iter()
                .skip(1)
                .map(|line| match line.split_once(": ") {
                    Some((label, value)) => TextLine::from(vec![
                        Span::styled(format!("{label}: "), Style::default().fg(MUTED)),
                        Span::raw(value.to_string()),
                    ]),
                    None => TextLine::from(line),
                }),
        );
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_track(f: &mut Frame<'_>, area: Rect, shape: &TrackShape) {
    match shape {
        TrackShape::Path { points } => {
            let ([left, right], [bottom, top]) = flipped_bounds(points);
            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .x_bounds([left, right])
                .y_bounds([bottom, top])
                .paint(|ctx| {
                    for pair in points.windows(2) {
                        draw_segment(ctx, pair[0], pair[1], ACCENT);
                    }
                    if let Some(start) = points.first() {
                        ctx.draw(&Points {
                            coords: &[(start.x, -start.y)],
                            color: Color::White,
                        });
                    }
                });
            f.render_widget(canvas, area);
        }
        TrackShape::Fallback => {
            let canvas = fallback_canvas().paint(|ctx| {
                draw_fallback_circuit(ctx);
                let (from, to) = START_LINE;
                draw_segment(ctx, from, to, Color::White);
            });
            f.render_widget(canvas, area);
        }
    }
}

fn render_replay(f: &mut Frame<'_>, area: Rect, frame: &ReplayFrame) {
    let canvas = fallback_canvas().paint(|ctx| {
        draw_fallback_circuit(ctx);
        ctx.layer();
        for car in &frame.cars {
            let color = hex_color(&car.color).unwrap_or(Color::White);
            ctx.draw(&Points {
                coords: &[(car.position.x, -car.position.y)],
                color,
            });
            ctx.print(
                car.position.x,
                -car.position.y,
                Span::styled(car.name.clone(), Style::default().fg(color)),
            );
        }
    });
    f.render_widget(canvas, area);
}

fn render_notice(f: &mut Frame<'_>, area: Rect, notice: &Notice) {
    f.render_widget(
        Paragraph::new(notice.message.as_str())
            .style(Style::default().fg(MUTED))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_failure(f: &mut Frame<'_>, area: Rect, placeholder: &ErrorPlaceholder) {
    let lines = vec![
        TextLine::from(Span::styled(
            placeholder.title.as_str(),
            Style::default().fg(FAILURE).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(Span::styled(
            placeholder.message.as_str(),
            Style::default().fg(FAILURE),
        )),
        TextLine::from(Span::styled(placeholder.hint, Style::default().fg(MUTED))),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Canvas over the 500x500 SVG viewport, y flipped so the picture matches
/// the browser.
fn fallback_canvas<'a, F: Fn(&mut Context<'_>)>() -> Canvas<'a, F> {
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, 500.0])
        .y_bounds([-500.0, 0.0])
}

fn draw_fallback_circuit(ctx: &mut Context<'_>) {
    let step = TAU / f64::from(ELLIPSE_SEGMENTS);
    for segment in 0..ELLIPSE_SEGMENTS {
        let from = FALLBACK_ELLIPSE.point_at(f64::from(segment) * step);
        let to = FALLBACK_ELLIPSE.point_at(f64::from(segment + 1) * step);
        draw_segment(ctx, from, to, ACCENT);
    }
}

fn draw_segment(ctx: &mut Context<'_>, from: TrackCoordinate, to: TrackCoordinate, color: Color) {
    ctx.draw(&CanvasLine {
        x1: from.x,
        y1: -from.y,
        x2: to.x,
        y2: -to.y,
        color,
    });
}

/// Padded x and y bounds of a path in canvas space (y negated).
fn flipped_bounds(points: &[TrackCoordinate]) -> ([f64; 2], [f64; 2]) {
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for point in points {
        min_x = min_x.min(point.x);
        max_x = max_x.max(point.x);
        min_y = min_y.min(point.y);
        max_y = max_y.max(point.y);
    }
    let pad = ((max_x - min_x).max(max_y - min_y) * 0.05).max(1.0);
    (
        [min_x - pad, max_x + pad],
        [-(max_y + pad), -(min_y - pad)],
    )
}

#[cfg(test)]
mod tests {
    use pitwall_core::PanelKind;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    #[test]
    fn segments_scale_with_the_bar() {
        assert_eq!(segment_cells(50.0, 40), 20);
        assert_eq!(segment_cells(100.0, 33), 33);
        assert_eq!(segment_cells(0.0, 40), 0);
    }

    #[test]
    fn bounds_cover_the_path_with_padding() {
        let points = [
            TrackCoordinate::new(100.0, 100.0),
            TrackCoordinate::new(400.0, 300.0),
        ];

        let ([left, right], [bottom, top]) = flipped_bounds(&points);

        assert!(left < 100.0 && right > 400.0);
        assert!(bottom < -300.0 && top > -100.0);
    }

    #[test]
    fn failure_draws_the_placeholder_text() -> Result<(), Box<dyn std::error::Error>> {
        let mut terminal = Terminal::new(TestBackend::new(40, 5))?;
        let view = PanelView::Failure(ErrorPlaceholder::for_panel(PanelKind::TyreStrategy));

        terminal.draw(|f| {
            let area = f.area();
            render_view(f, area, ContainerId::TyreStrategy, &view);
        })?;

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Could not load tyre strategy data"));
        Ok(())
    }
}
