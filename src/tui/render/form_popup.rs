use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_segmentation::UnicodeSegmentation;

use crate::tui::app::{App, FormField, FormKind, FormState};
use crate::util::unicode::{byte_offset_to_display_col, display_width};

const LABEL_W: usize = 9;
pub const DEADLINE_HINT: &str = "YYYY-MM-DDTHH:MM";

/// Render the add/edit popup over the list
pub fn render_form_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };
    let popup_w: u16 = 56.min(area.width.saturating_sub(2));
    let popup_h: u16 = 7;
    let field_w = (popup_w as usize).saturating_sub(2 + 1 + LABEL_W + 1);

    let bg = app.theme.background;
    let highlight = app.theme.highlight;
    let label_style = Style::default().fg(app.theme.dim).bg(bg);
    let focused_label = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(app.theme.text_bright).bg(bg);

    let title = match form.kind {
        FormKind::Add => " Tambah tugas ",
        FormKind::Edit { .. } => " Edit tugas ",
    };

    let mut lines = vec![Line::from("")];
    let mut cursor_pos = None;
    for (row, field, label, value) in [
        (1u16, FormField::Text, "Tugas:", &form.text),
        (2u16, FormField::Deadline, "Tenggat:", &form.deadline),
    ] {
        let focused = form.focus == field;
        let cursor = if focused { form.cursor } else { value.len() };
        let (shown, col) = visible_window(value, cursor, field_w);
        if focused {
            cursor_pos = Some((row, col));
        }
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<w$} ", label, w = LABEL_W),
                if focused { focused_label } else { label_style },
            ),
            Span::styled(shown, value_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(hint_line(app, form));

    let overlay_area = super::centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, focused_label))
        .border_style(Style::default().fg(highlight).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );

    if let Some((row, col)) = cursor_pos {
        let x = overlay_area.x + 1 + 1 + LABEL_W as u16 + 1 + col as u16;
        let y = overlay_area.y + row + 1;
        if x < overlay_area.right().saturating_sub(1) && y < overlay_area.bottom() {
            frame.set_cursor_position((x, y));
        }
    }
}

/// Format hint, or the validation error in red
fn hint_line<'a>(app: &App, form: &FormState) -> Line<'a> {
    let bg = app.theme.background;
    match &form.error {
        Some(err) => Line::from(Span::styled(
            format!(" {}", err),
            Style::default().fg(app.theme.red).bg(bg),
        )),
        None => Line::from(Span::styled(
            format!(" {:<w$} {}", "", DEADLINE_HINT, w = LABEL_W),
            Style::default().fg(app.theme.dim).bg(bg),
        )),
    }
}

/// The slice of `value` that fits in `width` cells with the cursor visible,
/// and the cursor's column within that slice.
fn visible_window(value: &str, cursor: usize, width: usize) -> (String, usize) {
    let col = byte_offset_to_display_col(value, cursor);
    if col < width {
        return (value.to_string(), col);
    }
    // Drop leading graphemes until the cursor fits
    let mut start = 0;
    let mut dropped = 0;
    for g in value.graphemes(true) {
        if col - dropped < width {
            break;
        }
        dropped += display_width(g);
        start += g.len();
    }
    (value[start..].to_string(), col - dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn add_form_layout() {
        let mut app = app_with_tasks(&[]);
        app.open_add_form();
        let form = app.form.as_mut().unwrap();
        form.text = "Beli susu".into();
        form.cursor = form.text.len();
        let out = render_to_string(60, 9, |frame, area| render_form_popup(frame, &app, area));
        assert!(out.contains(" Tambah tugas "));
        assert!(out.contains("Tugas:    Beli susu"));
        assert!(out.contains("Tenggat:"));
        assert!(out.contains(DEADLINE_HINT));
    }

    #[test]
    fn edit_form_shows_error() {
        let mut app = app_with_tasks(&[("1", "A", "2025-01-01T10:00", false)]);
        app.open_edit_form();
        app.form.as_mut().unwrap().deadline = "besok".into();
        app.submit_form();
        let out = render_to_string(60, 9, |frame, area| render_form_popup(frame, &app, area));
        assert!(out.contains(" Edit tugas "));
        assert!(out.contains("Format tenggat"));
        assert!(!out.contains(&format!("  {}", DEADLINE_HINT)));
    }

    #[test]
    fn long_values_scroll_with_cursor() {
        assert_eq!(visible_window("abc", 3, 10), ("abc".to_string(), 3));
        assert_eq!(visible_window("abcdef", 6, 4), ("def".to_string(), 3));
        assert_eq!(visible_window("abcdef", 1, 4), ("abcdef".to_string(), 1));
    }
}
