use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

#[cfg(test)]
use serde::Serialize;

/// Key abstraction over crossterm's key events, so key bindings can be
/// compared and deserialized from the config file.
#[derive(Debug, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(test, derive(Serialize))]
pub enum Key {
    Enter,
    Tab,
    BackTab,
    Backspace,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Insert,
    F(u8),
    Char(char),
    Ctrl(char),
    Alt(char),
    Unknown,
}

impl From<KeyEvent> for Key {
    fn from(key_event: KeyEvent) -> Self {
        match key_event {
            KeyEvent {
                code: KeyCode::Esc, ..
            } => Key::Esc,
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => Key::Backspace,
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => Key::Left,
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => Key::Right,
            KeyEvent {
                code: KeyCode::Up, ..
            } => Key::Up,
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => Key::Down,
            KeyEvent {
                code: KeyCode::Home,
                ..
            } => Key::Home,
            KeyEvent {
                code: KeyCode::End, ..
            } => Key::End,
            KeyEvent {
                code: KeyCode::PageUp,
                ..
            } => Key::PageUp,
            KeyEvent {
                code: KeyCode::PageDown,
                ..
            } => Key::PageDown,
            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => Key::Delete,
            KeyEvent {
                code: KeyCode::Insert,
                ..
            } => Key::Insert,
            KeyEvent {
                code: KeyCode::F(n), ..
            } => Key::F(n),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => Key::Enter,
            KeyEvent {
                code: KeyCode::Tab, ..
            } => Key::Tab,
            KeyEvent {
                code: KeyCode::BackTab,
                ..
            } => Key::BackTab,
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::ALT,
                ..
            } => Key::Alt(c),
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => Key::Ctrl(c),
            KeyEvent {
                code: KeyCode::Char(c),
                ..
            } => Key::Char(c),
            _ => Key::Unknown,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Key::Alt(' ') => write!(f, "<Alt+Space>"),
            Key::Ctrl(' ') => write!(f, "<Ctrl+Space>"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Alt(c) => write!(f, "<Alt+{}>", c),
            Key::Ctrl(c) => write!(f, "<Ctrl+{}>", c),
            Key::Enter => write!(f, "<Enter>"),
            Key::Tab => write!(f, "<Tab>"),
            Key::BackTab => write!(f, "<S-Tab>"),
            Key::Esc => write!(f, "<Esc>"),
            _ => write!(f, "<{:?}>", self),
        }
    }
}
