use std::time::Duration;
use tracing::trace;

use crate::domain::{DashConfig, DashError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind,
};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DashError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Some(Self::handle_raw_key(key))
                } else {
                    Self::handle_key(key)
                }
            }
            Event::Mouse(mouse) => Self::handle_mouse(mouse),
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }

    // Text input gets every key, Ctrl-c still quits
    fn handle_raw_key(key: KeyEvent) -> Message {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Message::Quit,
            _ => Message::RawKey(key),
        }
    }

    fn handle_key(key: KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) | (KeyCode::PageUp, _) => Some(Message::PreviousPage),
            (KeyCode::Right, _) | (KeyCode::PageDown, _) => Some(Message::NextPage),
            (KeyCode::Home, _) => Some(Message::FirstPage),
            (KeyCode::End, _) => Some(Message::LastPage),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('c'), _) => Some(Message::ColumnMenu),
            (KeyCode::Char(' '), _) => Some(Message::ToggleColumn),
            (KeyCode::Char('r'), _) => Some(Message::ResetColumns),
            (KeyCode::Char('x'), _) => Some(Message::Export),
            (KeyCode::Char('v'), _) => Some(Message::ToggleLayout),
            (KeyCode::Char('b'), _) => Some(Message::ToggleSidebar),
            (KeyCode::Tab, _) => Some(Message::NextSection),
            (KeyCode::BackTab, _) => Some(Message::PreviousSection),
            (KeyCode::Char('s'), _) => Some(Message::CycleStatus),
            (KeyCode::Char('e'), _) => Some(Message::EditNotes),
            (KeyCode::Char('l'), _) => Some(Message::LogCall),
            (KeyCode::Char('y'), _) => Some(Message::CopyPhone),
            (KeyCode::Char('Y'), _) => Some(Message::CopyEmail),
            (KeyCode::Char('L'), _) => Some(Message::Logout),
            (KeyCode::Char(c @ '1'..='9'), _) => c
                .to_digit(10)
                .map(|n| Message::SwitchPage(n as usize)),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn handle_mouse(mouse: MouseEvent) -> Option<Message> {
        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::Scroll(1)),
            MouseEventKind::ScrollUp => Some(Message::Scroll(-1)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Option<Message> {
        Controller::handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys_map_to_messages() {
        assert_eq!(press(KeyCode::Char('q')), Some(Message::Quit));
        assert_eq!(press(KeyCode::Char('j')), Some(Message::MoveDown));
        assert_eq!(press(KeyCode::Right), Some(Message::NextPage));
        assert_eq!(press(KeyCode::Char('3')), Some(Message::SwitchPage(3)));
        assert_eq!(press(KeyCode::Char('0')), None);
        assert_eq!(press(KeyCode::Char('z')), None);
    }

    #[test]
    fn shifted_letters_are_distinct() {
        let copy_email = Controller::handle_key(KeyEvent::new(KeyCode::Char('Y'), KeyModifiers::SHIFT));
        assert_eq!(copy_email, Some(Message::CopyEmail));
        assert_eq!(press(KeyCode::Char('l')), Some(Message::LogCall));
        assert_eq!(press(KeyCode::Char('L')), Some(Message::Logout));
    }

    #[test]
    fn raw_mode_passes_keys_through() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(Controller::handle_raw_key(key), Message::RawKey(key));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Controller::handle_raw_key(ctrl_c), Message::Quit);
    }
}
