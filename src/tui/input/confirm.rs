use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Confirm: y
        (KeyModifiers::NONE, KeyCode::Char('y')) => app.answer_confirm(true),
        // Cancel: n or Esc
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => app.answer_confirm(false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_keys::*;
    use crate::model::task::TaskFields;
    use crate::ops::sort::SortKey;
    use crate::sync::{PendingOp, Reply, TaskStore};
    use crate::tui::app::{App, Mode};
    use crate::tui::input::handle_key;
    use crate::tui::theme::Theme;
    use crossterm::event::KeyCode;

    fn confirming() -> App {
        let mut app = App::new(TaskStore::new(), SortKey::Insertion, Theme::default(), "memory");
        let docs = vec![("7".to_string(), TaskFields::new_task("Bayar listrik", "2025-02-01T08:00"))];
        app.apply_completion(PendingOp::Load, Ok(Reply::Listed(docs)));
        handle_key(&mut app, ch('d'));
        app
    }

    #[test]
    fn yes_queues_remove() {
        let mut app = confirming();
        handle_key(&mut app, ch('y'));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.outbox, vec![PendingOp::Remove { id: "7".into() }]);
        // Still listed until the store confirms
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn no_and_escape_cancel() {
        for k in [ch('n'), key(KeyCode::Esc)] {
            let mut app = confirming();
            handle_key(&mut app, k);
            assert_eq!(app.mode, Mode::Navigate);
            assert!(app.confirm_id.is_none());
            assert!(app.outbox.is_empty());
        }
    }

    #[test]
    fn other_keys_wait() {
        let mut app = confirming();
        handle_key(&mut app, ch('j'));
        assert_eq!(app.mode, Mode::Confirm);
    }
}
