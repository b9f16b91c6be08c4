use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line text editor fed with raw key events.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize, // In chars, not bytes
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub cursor_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.current_input.clear();
                self.cursor_pos = 0;
                self.get()
            }
            (kc, km) => self.key(kc, km),
        }
    }

    /// Replace the content and put the cursor at its end.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.cursor_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            cursor_pos: self.cursor_pos,
        }
    }

    pub fn value(&self) -> &str {
        &self.current_input
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.cursor_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_pos();
            self.current_input.remove(at);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.cursor_pos < self.current_input.chars().count() {
            let at = self.byte_pos();
            self.current_input.remove(at);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.cursor_pos < self.current_input.chars().count() {
            self.cursor_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.cursor_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.cursor_pos = self.current_input.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            trace!("Ignoring {code:?} with {modifier:?}");
        } else if let Some(chr) = code.as_char() {
            let at = self.byte_pos();
            self.current_input.insert(at, chr);
            self.cursor_pos += 1;
        }
        self.get()
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn type_str(input: &mut Inputter, s: &str) {
        for c in s.chars() {
            input.read(KeyEvent::from(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_and_editing_in_the_middle() {
        let mut input = Inputter::default();
        type_str(&mut input, "contct");
        input.read(KeyCode::Left.into());
        input.read(KeyCode::Left.into());
        type_str(&mut input, "a");
        assert_eq!(input.value(), "contact");

        input.read(KeyCode::Backspace.into());
        assert_eq!(input.value(), "contct");
        assert_eq!(input.get().cursor_pos, 4);
    }

    #[test]
    fn multibyte_characters_are_handled() {
        let mut input = Inputter::default();
        input.set("Zoë");
        input.read(KeyCode::Backspace.into());
        assert_eq!(input.value(), "Zo");
        type_str(&mut input, "é");
        input.read(KeyCode::Home.into());
        input.read(KeyCode::Delete.into());
        assert_eq!(input.value(), "oé");
    }

    #[test]
    fn enter_finishes_escape_cancels() {
        let mut input = Inputter::default();
        type_str(&mut input, "abc");
        let result = input.read(KeyCode::Enter.into());
        assert!(result.finished && !result.canceled);
        assert_eq!(result.input, "abc");

        let result = input.read(KeyCode::Esc.into());
        assert!(result.finished && result.canceled);
        assert_eq!(result.input, "");
    }

    #[test]
    fn control_chords_do_not_insert() {
        let mut input = Inputter::default();
        input.set("abc");
        input.read(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "abc");
        input.read(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
    }
}
