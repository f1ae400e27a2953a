use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

pub const CONFIRM_PROMPT: &str = "Yakin ingin menghapus?";

/// Render the delete confirmation popup
pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(4) as usize;

    let bg = app.theme.background;
    let red = app.theme.red;
    let task_text = app
        .confirm_id
        .as_deref()
        .and_then(|id| app.store.get(id))
        .map(|t| t.text.as_str())
        .unwrap_or("");

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", CONFIRM_PROMPT),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" \u{201c}{}\u{201d}", truncate_to_width(task_text, inner_w)),
            Style::default().fg(app.theme.text).bg(bg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(red).bg(bg)),
            Span::styled(" hapus   ", Style::default().fg(app.theme.dim).bg(bg)),
            Span::styled("n", Style::default().fg(app.theme.highlight).bg(bg)),
            Span::styled(" batal", Style::default().fg(app.theme.dim).bg(bg)),
        ]),
    ];

    let overlay_area = super::centered_rect_fixed(popup_w, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(red).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );
}
