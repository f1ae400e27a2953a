use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::handlers::EMPTY_LIST;
use crate::cli::output::format_deadline;
use crate::model::task::Task;
use crate::ops::countdown::{is_overdue, remaining_label};
use crate::tui::app::App;
use crate::util::unicode::{pad_to_width, truncate_to_width};

const DATE_W: usize = 16;
/// Fits "999h 59m 59s" and "waktu habis"
const REMAINING_W: usize = 12;
/// Everything on a row except the text column
const FIXED_W: usize = 1 + 3 + 1 + 2 + DATE_W + 2 + REMAINING_W + 1;
const MIN_TEXT_W: usize = 8;

/// Render the task list content area
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;

    if app.store.is_empty() {
        let empty = Paragraph::new(format!(" {}", EMPTY_LIST))
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the cursor on screen
    let visible_height = area.height as usize;
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if visible_height > 0 && app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor + 1 - visible_height;
    }

    let text_w = (area.width as usize).saturating_sub(FIXED_W).max(MIN_TEXT_W);
    let lines: Vec<Line> = app
        .view()
        .into_iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(visible_height)
        .map(|(idx, task)| task_line(app, task, idx == app.cursor, text_w))
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn task_line<'a>(app: &App, task: &Task, selected: bool, text_w: usize) -> Line<'a> {
    let theme = &app.theme;
    let bg = if selected { theme.selection_bg } else { theme.background };
    let base = Style::default().fg(theme.text).bg(bg);

    let (check, check_style) = if task.completed {
        ("[x]", base.fg(theme.green))
    } else {
        ("[ ]", base.fg(theme.dim))
    };
    let text_style = if task.completed {
        base.fg(theme.dim).add_modifier(Modifier::CROSSED_OUT)
    } else if selected {
        base.fg(theme.text_bright)
    } else {
        base
    };
    let remaining_style = if is_overdue(task, app.now_ms) {
        base.fg(theme.red)
    } else if task.completed {
        base.fg(theme.dim)
    } else {
        base.fg(theme.yellow)
    };

    let text = pad_to_width(&truncate_to_width(&task.text, text_w), text_w);
    let date = pad_to_width(&format_deadline(&task.deadline), DATE_W);
    let remaining = format!("{:>w$}", remaining_label(task, app.now_ms), w = REMAINING_W);

    Line::from(vec![
        Span::styled(" ", base),
        Span::styled(check, check_style),
        Span::styled(" ", base),
        Span::styled(text, text_style),
        Span::styled("  ", base),
        Span::styled(date, base.fg(theme.dim)),
        Span::styled("  ", base),
        Span::styled(remaining, remaining_style),
        Span::styled(" ", base),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::sort::SortKey;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    const TASKS: &[(&str, &str, &str, bool)] = &[
        ("1", "Beli susu", "2025-01-01T10:00", true),
        ("2", "Bayar tagihan listrik bulan ini", "2025-01-01T10:30", false),
        ("3", "Cuci mobil", "kapan-kapan", false),
    ];

    fn list(app: &mut App, w: u16, h: u16) -> String {
        render_to_string(w, h, |frame, area| render_task_list(frame, app, area))
    }

    #[test]
    fn empty_list_message() {
        let mut app = app_with_tasks(&[]);
        assert_eq!(list(&mut app, 40, 3), " Belum ada tugas ditambahkan");
    }

    #[test]
    fn rows_show_countdowns() {
        let mut app = app_with_tasks(TASKS);
        app.now_ms = hour_before(&app, "2");
        assert_eq!(
            list(&mut app, 50, 5),
            [
                " [x] Beli susu     2025-01-01 10:00       selesai",
                " [ ] Bayar tagih\u{2026}  2025-01-01 10:30      1h 0m 0s",
                " [ ] Cuci mobil    kapan-kapan                  -",
            ]
            .join("\n")
        );
    }

    #[test]
    fn overdue_rows_read_time_up() {
        let mut app = app_with_tasks(TASKS);
        app.now_ms = hour_before(&app, "2") + 2 * 3_600_000;
        let out = list(&mut app, 50, 5);
        assert!(out.lines().nth(1).unwrap().ends_with("waktu habis"));
    }

    #[test]
    fn sort_order_follows_app() {
        let mut app = app_with_tasks(TASKS);
        app.sort = SortKey::Name;
        let out = list(&mut app, 50, 5);
        let texts: Vec<&str> = out.lines().map(|l| &l[5..15]).collect();
        assert_eq!(texts, vec!["Bayar tagi", "Beli susu ", "Cuci mobil"]);
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let mut app = app_with_tasks(TASKS);
        app.cursor = 2;
        let out = list(&mut app, 50, 2);
        assert_eq!(app.scroll_offset, 1);
        assert!(out.lines().last().unwrap().contains("Cuci mobil"));
        app.cursor = 0;
        list(&mut app, 50, 2);
        assert_eq!(app.scroll_offset, 0);
    }
}
