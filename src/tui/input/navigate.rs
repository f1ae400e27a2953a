use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Any key dismisses the last notice
    app.status = None;

    if key.modifiers != KeyModifiers::NONE {
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Movement
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.cursor = app.store.len().saturating_sub(1),

        // Task actions
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.open_delete_confirm(),
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_at_cursor(),

        // View
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('r') => app.request_reload(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_keys::*;
    use crate::model::task::{Task, TaskFields};
    use crate::ops::sort::SortKey;
    use crate::sync::{PendingOp, Reply, TaskStore};
    use crate::tui::app::{App, Mode};
    use crate::tui::input::handle_key;
    use crate::tui::theme::Theme;
    use crossterm::event::KeyCode;

    fn app_with(n: usize) -> App {
        let mut app = App::new(TaskStore::new(), SortKey::Insertion, Theme::default(), "memory");
        let docs = (0..n)
            .map(|i| {
                (
                    i.to_string(),
                    TaskFields::new_task(format!("tugas {}", i), "2025-01-01T10:00"),
                )
            })
            .collect();
        app.apply_completion(PendingOp::Load, Ok(Reply::Listed(docs)));
        app
    }

    #[test]
    fn movement_is_clamped() {
        let mut app = app_with(3);
        handle_key(&mut app, ch('k'));
        assert_eq!(app.cursor, 0);
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, ch('j'));
        assert_eq!(app.cursor, 2);
        handle_key(&mut app, ch('g'));
        assert_eq!(app.cursor, 0);
        handle_key(&mut app, ch('G'));
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn movement_on_empty_list() {
        let mut app = app_with(0);
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('G'));
        assert_eq!(app.cursor, 0);
        handle_key(&mut app, ch('e'));
        handle_key(&mut app, ch('d'));
        assert_eq!(app.mode, Mode::Navigate);
    }

    #[test]
    fn action_keys_switch_modes() {
        let mut app = app_with(1);
        handle_key(&mut app, ch('a'));
        assert_eq!(app.mode, Mode::Form);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        handle_key(&mut app, ch('d'));
        assert_eq!(app.mode, Mode::Confirm);
        assert_eq!(app.confirm_id.as_deref(), Some("0"));
    }

    #[test]
    fn space_toggles_and_queues_write() {
        let mut app = app_with(1);
        handle_key(&mut app, ch(' '));
        let task: &Task = app.store.get("0").unwrap();
        assert!(task.completed);
        assert_eq!(
            app.outbox,
            vec![PendingOp::Toggle {
                id: "0".into(),
                completed: true
            }]
        );
    }

    #[test]
    fn reload_and_quit() {
        let mut app = app_with(1);
        handle_key(&mut app, ch('r'));
        assert_eq!(app.outbox, vec![PendingOp::Load]);
        handle_key(&mut app, ch('q'));
        assert!(app.should_quit);
    }
}
