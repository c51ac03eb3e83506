use tui::{
    backend::Backend,
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::{config::KeyConfig, event::key::Key};

use super::{centered_rect, commands::CommandInfo, draw_block_style, Component, EventState};

/// Popup for errors that escape the per-view error handling, e.g. a draw
/// failure. Everything request-shaped is rendered inline by its own view.
pub struct ErrorComponent {
    pub error: String,
    visible: bool,
    key_config: KeyConfig,
}

impl ErrorComponent {
    pub fn new(key_config: KeyConfig) -> Self {
        Self {
            error: String::new(),
            visible: false,
            key_config,
        }
    }

    pub fn set(&mut self, error: String) {
        self.error = error;
        self.visible = true;
    }

    pub fn draw<B: Backend>(&mut self, f: &mut Frame<'_, B>) -> anyhow::Result<()> {
        if !self.visible {
            return Ok(());
        }

        let area = centered_rect(65, 10, f.size());
        let paragraph = Paragraph::new(self.error.as_str())
            .block(draw_block_style(true, "Error"))
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(paragraph, area);
        Ok(())
    }
}

impl Component for ErrorComponent {
    fn commands(&self, _out: &mut Vec<CommandInfo>) {}

    fn event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if !self.visible {
            return Ok(EventState::NotConsumed);
        }
        if key == self.key_config.esc || key == self.key_config.enter {
            self.error.clear();
            self.hide();
            return Ok(EventState::Consumed);
        }
        Ok(EventState::NotConsumed)
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn show(&mut self) -> anyhow::Result<()> {
        self.visible = true;
        Ok(())
    }
}
