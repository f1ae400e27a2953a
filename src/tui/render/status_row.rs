use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::interact::NoticeKind;
use crate::tui::app::{App, Mode};
use crate::util::unicode::display_width;

const NAVIGATE_HINT: &str = "a tambah  e edit  d hapus  spasi selesai  s urut  q keluar ";
const FORM_HINT: &str = "Tab pindah  Enter simpan  Esc batal ";
const CONFIRM_HINT: &str = "y hapus  n batal ";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some(status) = &app.status {
        let color = match status.kind {
            NoticeKind::Success => app.theme.green,
            NoticeKind::Error => app.theme.red,
        };
        spans.push(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color).bg(bg),
        ));
    }

    let hint = match app.mode {
        Mode::Navigate => NAVIGATE_HINT,
        Mode::Form => FORM_HINT,
        Mode::Confirm => CONFIRM_HINT,
    };
    // The hint yields to the message when both do not fit
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::interact::Notice;
    use crate::tui::render::test_helpers::*;

    fn row(app: &App, w: u16) -> String {
        render_to_string(w, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn hints_follow_mode() {
        let mut app = app_with_tasks(&[("1", "A", "2025-01-01T10:00", false)]);
        assert!(row(&app, 80).ends_with("q keluar"));
        app.open_add_form();
        assert!(row(&app, 80).ends_with("Esc batal"));
        app.cancel_form();
        app.open_delete_confirm();
        assert!(row(&app, 80).ends_with("n batal"));
    }

    #[test]
    fn notice_on_the_left() {
        let mut app = app_with_tasks(&[]);
        app.set_status(Notice::success("Tugas ditambahkan."));
        let out = row(&app, 80);
        assert!(out.starts_with(" Tugas ditambahkan."));
        assert!(out.ends_with("q keluar"));
    }

    #[test]
    fn narrow_row_drops_hint() {
        let mut app = app_with_tasks(&[]);
        app.set_status(Notice::success("Tugas berhasil dihapus."));
        assert_eq!(row(&app, 30), " Tugas berhasil dihapus.");
    }
}
