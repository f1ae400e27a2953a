use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::task::TaskFields;
use crate::ops::sort::SortKey;
use crate::sync::{PendingOp, Reply, TaskStore};
use crate::tui::app::App;
use crate::tui::theme::Theme;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole screen
pub fn render_app(app: &mut App, w: u16, h: u16) -> String {
    render_to_string(w, h, |frame, _| super::render(frame, app))
}

/// An App whose first load returned `tasks` as `(id, text, deadline, completed)`.
pub fn app_with_tasks(tasks: &[(&str, &str, &str, bool)]) -> App {
    let mut app = App::new(TaskStore::new(), SortKey::Insertion, Theme::default(), "memory");
    let docs = tasks
        .iter()
        .map(|&(id, text, deadline, completed)| {
            let mut fields = TaskFields::new_task(text, deadline);
            fields.completed = completed;
            (id.to_string(), fields)
        })
        .collect();
    app.apply_completion(PendingOp::Load, Ok(Reply::Listed(docs)));
    app
}

/// Milliseconds one hour before the deadline of task `id`
pub fn hour_before(app: &App, id: &str) -> i64 {
    app.store.get(id).and_then(|t| t.deadline_millis()).unwrap() - 3_600_000
}
