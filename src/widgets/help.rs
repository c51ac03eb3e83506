use tui::{
    backend::Backend,
    text::{Span, Spans},
    widgets::{Clear, List, ListItem, ListState},
    Frame,
};

use crate::{config::KeyConfig, event::key::Key};

use super::{
    centered_rect, commands,
    commands::{CommandInfo, CommandText},
    draw_block_style, draw_highlight_style, Component, EventState,
};

pub struct HelpWidget {
    commands: Vec<CommandText>,
    visible: bool,
    state: ListState,
    key_config: KeyConfig,
}

impl HelpWidget {
    pub fn new(key_config: KeyConfig) -> Self {
        let commands = vec![
            commands::help(&key_config),
            commands::quit(&key_config),
            commands::go_back(&key_config),
            commands::scroll(&key_config),
            commands::scroll_up_down_multiple_lines(&key_config),
            commands::scroll_to_top_bottom(&key_config),
            commands::edit_field(&key_config),
            commands::submit_login(&key_config),
            commands::toggle_token(&key_config),
            commands::filter(&key_config),
            commands::select_project(&key_config),
            commands::retry(&key_config),
            commands::logout(&key_config),
            commands::exit_pop_up(&key_config),
        ];

        let mut state = ListState::default();
        state.select(Some(0));

        Self {
            commands,
            visible: false,
            state,
            key_config,
        }
    }

    pub fn draw<B: Backend>(&mut self, f: &mut Frame<'_, B>) -> anyhow::Result<()> {
        if !self.visible {
            return Ok(());
        }

        let mut list_items: Vec<ListItem> = Vec::new();
        let mut current_group = "";
        for command in &self.commands {
            if command.group != current_group {
                current_group = command.group;
                list_items.push(ListItem::new(vec![Spans::from(Span::raw(
                    current_group.to_string(),
                ))]));
            }
            list_items.push(ListItem::new(vec![Spans::from(Span::raw(format!(
                "  {}",
                command.name
            )))]));
        }

        let list = List::new(list_items)
            .block(draw_block_style(true, "Help"))
            .highlight_style(draw_highlight_style());

        let area = centered_rect(60, 20, f.size());
        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut self.state);

        Ok(())
    }

    fn next(&mut self, line: usize) {
        let last = self.commands.len().saturating_sub(1);
        let i = self.state.selected().map(|i| (i + line).min(last));
        self.state.select(i);
    }

    fn previous(&mut self, line: usize) {
        let i = self
            .state
            .selected()
            .map(|i| if i <= line { 0 } else { i - line });
        self.state.select(i);
    }
}

impl Component for HelpWidget {
    fn commands(&self, _out: &mut Vec<CommandInfo>) {}

    fn event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if !self.visible {
            return Ok(EventState::NotConsumed);
        }

        if key == self.key_config.esc || key == self.key_config.open_help {
            self.hide();
            return Ok(EventState::Consumed);
        } else if key == self.key_config.scroll_down {
            self.next(1);
            return Ok(EventState::Consumed);
        } else if key == self.key_config.scroll_up {
            self.previous(1);
            return Ok(EventState::Consumed);
        }

        // swallow everything else while the popup is open
        Ok(EventState::Consumed)
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
