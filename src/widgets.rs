pub mod commands;
pub mod error;
pub mod help;
pub mod login;
pub mod project_detail;
pub mod projects;

use commands::CommandInfo;

use async_trait::async_trait;
use tui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
};

#[derive(PartialEq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(PartialEq, Debug)]
pub enum EventState {
    Consumed,
    NotConsumed,
}

impl EventState {
    pub fn is_consumed(&self) -> bool {
        *self == Self::Consumed
    }
}

impl From<bool> for EventState {
    fn from(consumed: bool) -> Self {
        if consumed {
            Self::Consumed
        } else {
            Self::NotConsumed
        }
    }
}

/// base component trait
#[async_trait]
pub trait Component {
    fn commands(&self, out: &mut Vec<CommandInfo>);

    fn event(&mut self, key: crate::event::key::Key) -> anyhow::Result<EventState>;

    fn focused(&self) -> bool {
        false
    }

    fn focus(&mut self, _focus: bool) {}

    fn is_visible(&self) -> bool {
        true
    }

    fn hide(&mut self) {}

    fn show(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn toggle_visible(&mut self) -> anyhow::Result<()> {
        if self.is_visible() {
            self.hide();
            Ok(())
        } else {
            self.show()
        }
    }
}

pub fn draw_block_style(focused: bool, title: &str) -> Block {
    if focused {
        Block::default()
            .border_type(BorderType::Double)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(title)
            .title_alignment(tui::layout::Alignment::Center)
    } else {
        Block::default()
            .border_type(BorderType::Plain)
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(tui::layout::Alignment::Center)
    }
}

pub fn draw_highlight_style() -> Style {
    Style::default().bg(Color::Blue)
}

/// Popup area centered on the frame, clamped to the frame size.
pub fn centered_rect(width: u16, height: u16, frame: Rect) -> Rect {
    Rect::new(
        frame.x + (frame.width.saturating_sub(width)) / 2,
        frame.y + (frame.height.saturating_sub(height)) / 2,
        width.min(frame.width),
        height.min(frame.height),
    )
}
