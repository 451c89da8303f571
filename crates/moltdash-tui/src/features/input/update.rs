use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::InputState;

/// What the reducer should do after an input key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Key was not an editing key.
    Ignored,
    Edited,
    /// Enter with non-blank text.
    Submit(String),
}

/// Applies an editing key to the buffer.
pub fn handle_key(input: &mut InputState, key: KeyEvent) -> InputAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => {
            if input.submitting || input.text().trim().is_empty() {
                return InputAction::Edited;
            }
            input.submitting = true;
            InputAction::Submit(input.text().to_string())
        }
        KeyCode::Char('w') if ctrl => {
            input.delete_word_left();
            InputAction::Edited
        }
        KeyCode::Char('u') if ctrl => {
            input.clear();
            InputAction::Edited
        }
        KeyCode::Char('a') if ctrl => {
            input.move_home();
            InputAction::Edited
        }
        KeyCode::Char('e') if ctrl => {
            input.move_end();
            InputAction::Edited
        }
        KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            input.insert_char(ch);
            InputAction::Edited
        }
        KeyCode::Backspace => {
            input.backspace();
            InputAction::Edited
        }
        KeyCode::Delete => {
            input.delete();
            InputAction::Edited
        }
        KeyCode::Left => {
            input.move_left();
            InputAction::Edited
        }
        KeyCode::Right => {
            input.move_right();
            InputAction::Edited
        }
        KeyCode::Home => {
            input.move_home();
            InputAction::Edited
        }
        _ => InputAction::Ignored,
    }
}

pub fn handle_paste(input: &mut InputState, text: &str) {
    input.insert_str(text);
}
