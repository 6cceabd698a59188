use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent};
use tracing::trace;

use crate::domain::{MenuKind, Message, SubTrackConfig, SubTrackError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &SubTrackConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, SubTrackError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(Self::handle_key(key));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    pub fn handle_key(key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::PreviousPage),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::NextPage),
            KeyCode::Char(' ') => Some(Message::ToggleRow),
            KeyCode::Char('a') => Some(Message::ToggleAllVisible),
            KeyCode::Char('/') => Some(Message::EditQuery),
            KeyCode::Char('s') => Some(Message::OpenMenu(MenuKind::Status)),
            KeyCode::Char('c') => Some(Message::OpenMenu(MenuKind::Category)),
            KeyCode::Char('v') => Some(Message::OpenMenu(MenuKind::Columns)),
            KeyCode::Char('r') => Some(Message::CycleRowsPerPage),
            KeyCode::Char('x') => Some(Message::ResetFilters),
            KeyCode::Char('y') => Some(Message::CopySelection),
            KeyCode::Char('u') => Some(Message::ClearSelection),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                c.to_digit(10).map(|d| Message::Digit(d as usize))
            }
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_messages() {
        assert_eq!(Controller::handle_key(key(KeyCode::Char('q'))), Some(Message::Quit));
        assert_eq!(Controller::handle_key(key(KeyCode::Right)), Some(Message::NextPage));
        assert_eq!(
            Controller::handle_key(key(KeyCode::Char('c'))),
            Some(Message::OpenMenu(MenuKind::Category))
        );
        assert_eq!(Controller::handle_key(key(KeyCode::Char('7'))), Some(Message::Digit(7)));
        assert_eq!(Controller::handle_key(key(KeyCode::Char('u'))), Some(Message::ClearSelection));
        assert_eq!(Controller::handle_key(key(KeyCode::Char('0'))), None);
        assert_eq!(Controller::handle_key(key(KeyCode::Char('z'))), None);
    }
}
