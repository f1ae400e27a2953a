pub mod confirm_popup;
pub mod form_popup;
pub mod status_row;
pub mod task_list;

#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::util::unicode::display_width;

use super::app::{App, Mode};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (1 row) | separator | task list | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1]);
    task_list::render_task_list(frame, app, chunks[2]);

    match app.mode {
        Mode::Form => form_popup::render_form_popup(frame, app, area),
        Mode::Confirm => confirm_popup::render_confirm_popup(frame, app, area),
        Mode::Navigate => {}
    }

    status_row::render_status_row(frame, app, chunks[3]);
}

/// Title on the left; count, order and backend on the right
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let title = " todoliez";
    let mut info = format!(
        "{} tugas \u{00b7} {} \u{00b7} {} ",
        app.store.len(),
        app.sort.label(),
        app.backend_name
    );
    if app.loading {
        info = format!("memuat\u{2026} \u{00b7} {}", info);
    }

    let mut spans = vec![Span::styled(
        title,
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = display_width(title) + display_width(&info);
    let width = area.width as usize;
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.push(Span::styled(info, Style::default().fg(app.theme.dim).bg(bg)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect) {
    let line = "\u{2500}".repeat(area.width as usize);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().fg(app.theme.dim).bg(app.theme.background)),
        area,
    );
}

/// Fixed-size rect centered in `area`, shrunk to fit
pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn header_shows_count_sort_and_backend() {
        let mut app = app_with_tasks(&[("1", "Beli susu", "2025-01-01T10:00", false)]);
        let out = render_app(&mut app, 60, 6);
        let first = out.lines().next().unwrap();
        assert!(first.starts_with(" todoliez"));
        assert!(first.ends_with("1 tugas \u{00b7} insertion \u{00b7} memory"));
    }

    #[test]
    fn header_marks_loading() {
        let mut app = app_with_tasks(&[]);
        app.request_reload();
        let out = render_app(&mut app, 60, 6);
        assert!(out.lines().next().unwrap().contains("memuat\u{2026}"));
    }

    #[test]
    fn centered_rect_fits_small_areas() {
        let r = centered_rect_fixed(40, 10, Rect::new(0, 0, 20, 5));
        assert_eq!(r, Rect::new(0, 0, 20, 5));
        let r = centered_rect_fixed(10, 4, Rect::new(0, 0, 20, 10));
        assert_eq!(r, Rect::new(5, 3, 10, 4));
    }
}
