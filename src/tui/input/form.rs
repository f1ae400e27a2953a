use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_form();
            return;
        }
        KeyCode::Enter => {
            app.submit_form();
            return;
        }
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };
    match (key.modifiers, key.code) {
        (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => form.switch_focus(),
        (_, KeyCode::Left) => form.move_left(),
        (_, KeyCode::Right) => form.move_right(),
        (_, KeyCode::Home) => form.move_home(),
        (_, KeyCode::End) => form.move_end(),
        (_, KeyCode::Backspace) => form.backspace(),
        (_, KeyCode::Delete) => form.delete(),
        (KeyModifiers::CONTROL, KeyCode::Char('a')) => form.move_home(),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => form.move_end(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            form.move_home();
            clear_focused(form);
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            form.error = None;
            form.insert_char(c);
        }
        _ => {}
    }
}

fn clear_focused(form: &mut crate::tui::app::FormState) {
    while form.cursor < form.focused().len() {
        form.delete();
    }
}
