// UI module for the pitwall dashboard
// Lays out one bordered block per container and draws it from the surface

pub mod palette;
pub mod panels;

use log::Level;
use pitwall_core::surface::ContainerState;
use pitwall_core::{ContainerId, IndicatorSize};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, WhichUse, BRAILLE_SIX};

use crate::app::App;
use palette::{ACCENT, BORDER, BORDER_BUSY, FAILURE, MUTED};

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(app, f, rows[0]);
    render_dashboard(app, f, rows[1]);
    render_footer(app, f, rows[2]);
}

fn render_header(app: &App, f: &mut Frame<'_>, area: Rect) {
    let race = app
        .selected_event()
        .unwrap_or_else(|| "No race selected".to_string());
    let line = TextLine::from(vec![
        Span::styled(
            "PITWALL",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Season ", Style::default().fg(MUTED)),
        Span::raw(format!("◀ {} ▶", app.year())),
        Span::styled("   Race ", Style::default().fg(MUTED)),
        Span::styled(race, Style::default().add_modifier(Modifier::BOLD)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_dashboard(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(8),
            Constraint::Min(8),
        ])
        .split(columns[0]);
    render_container(app, f, left[0], ContainerId::EventSelect);
    render_container(app, f, left[1], ContainerId::TrackStats);
    render_container(app, f, left[2], ContainerId::TrackMap);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(right[0]);
    render_container(app, f, top[0], ContainerId::Results);
    render_container(app, f, top[1], ContainerId::PositionChart);

    let bottom_panels: Vec<ContainerId> = [
        ContainerId::TyreStrategy,
        ContainerId::Pitstops,
        ContainerId::Replay,
    ]
    .into_iter()
    .filter(|id| app.wired(*id))
    .collect();
    if bottom_panels.is_empty() {
        return;
    }
    let count = u32::try_from(bottom_panels.len()).unwrap_or(1);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(bottom_panels.iter().map(|_| Constraint::Ratio(1, count)))
        .split(right[1]);
    for (id, area) in bottom_panels.into_iter().zip(bottom.iter()) {
        render_container(app, f, *area, id);
    }
}

fn render_container(app: &App, f: &mut Frame<'_>, area: Rect, id: ContainerId) {
    let state = app.surface.container(id).unwrap_or_default();
    let busy = state.indicator_nodes > 0 && state.indicator_visible;
    let block = Block::default()
        .title(id.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if busy { BORDER_BUSY } else { BORDER }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if id == ContainerId::EventSelect {
        render_event_list(app, f, inner);
    } else if let Some(view) = &state.view {
        panels::render_view(f, inner, id, view);
    } else if !busy {
        f.render_widget(
            Paragraph::new("Waiting for a race")
                .style(Style::default().fg(MUTED))
                .alignment(Alignment::Center),
            inner,
        );
    }

    if busy {
        render_indicator(app, f, inner, &state);
    }
}

fn render_event_list(app: &App, f: &mut Frame<'_>, area: Rect) {
    let selected = app.selected_event();
    let items: Vec<ListItem<'_>> = app
        .events()
        .into_iter()
        .map(|event| {
            let marker = if selected.as_deref() == Some(event.as_str()) {
                "● "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{event}"))
        })
        .collect();
    if items.is_empty() {
        return;
    }

    let list = List::new(items)
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.event_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

/// The spinner overlays the first line of the container; the large variant
/// sits in the middle.
fn render_indicator(app: &App, f: &mut Frame<'_>, area: Rect, state: &ContainerState) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let (label, row) = match state.indicator_size {
        Some(IndicatorSize::Small) => ("", area.y),
        Some(IndicatorSize::Large) => ("Loading circuit", area.y + area.height / 2),
        Some(IndicatorSize::Normal) | None => ("Loading", area.y),
    };
    let overlay = Rect {
        x: area.x,
        y: row,
        width: area.width,
        height: 1,
    };

    let throbber = Throbber::default()
        .label(label)
        .style(Style::default().fg(MUTED))
        .throbber_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .throbber_set(BRAILLE_SIX)
        .use_type(WhichUse::Spin);
    let mut throbber_state = app.throbber_state.clone();
    f.render_widget(Clear, overlay);
    f.render_stateful_widget(throbber, overlay, &mut throbber_state);
}

fn render_footer(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_style = match app.status.level {
        Some(Level::Error) => Style::default().fg(FAILURE),
        Some(Level::Warn) => Style::default().fg(BORDER_BUSY),
        _ => Style::default().fg(MUTED),
    };
    let line = TextLine::from(vec![
        Span::styled(
            "←/→ season  ↑/↓ race  Enter load  r refresh  q quit",
            Style::default().fg(MUTED),
        ),
        Span::raw("   "),
        Span::styled(app.status.text.as_str(), status_style),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));
    f.render_widget(Paragraph::new(line).block(block), area);
}
