use crossterm::event::KeyCode;

use super::App;

pub fn handle_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Left => app.change_year(-1),
        KeyCode::Right => app.change_year(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_event_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_event_cursor(1),
        KeyCode::Enter => app.load_highlighted_event(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
}
