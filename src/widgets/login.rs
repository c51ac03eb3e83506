use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    config::KeyConfig,
    event::key::Key,
    jira::auth::{email_is_valid, Credentials},
    session::SessionState,
};

use super::{
    centered_rect, commands::CommandInfo, draw_block_style, Component, EventState, InputMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    ApiToken,
    Domain,
}

/// The sign-in form. Validation failures stay on their field and never
/// reach the network; backend failures arrive back through the session
/// state and render as a banner.
pub struct LoginWidget {
    email: String,
    api_token: String,
    domain: String,
    field: LoginField,
    pub input_mode: InputMode,
    show_token: bool,
    email_error: Option<&'static str>,
    token_error: Option<&'static str>,
    domain_error: Option<&'static str>,
    key_config: KeyConfig,
}

impl LoginWidget {
    pub fn new(key_config: KeyConfig) -> Self {
        Self {
            email: String::new(),
            api_token: String::new(),
            domain: String::new(),
            field: LoginField::Email,
            input_mode: InputMode::Editing,
            show_token: false,
            email_error: None,
            token_error: None,
            domain_error: None,
            key_config,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.input_mode == InputMode::Editing
    }

    /// Check the raw form input. Returns false and records field errors
    /// when the form must not be submitted.
    pub fn validate(&mut self) -> bool {
        self.email_error = if self.email.trim().is_empty() {
            Some("Email is required")
        } else if !email_is_valid(&self.email) {
            Some("Please enter a valid email address")
        } else {
            None
        };

        self.token_error = if self.api_token.trim().is_empty() {
            Some("API token is required")
        } else {
            None
        };

        self.domain_error = if self.domain.trim().is_empty() {
            Some("Domain is required")
        } else {
            None
        };

        self.email_error.is_none() && self.token_error.is_none() && self.domain_error.is_none()
    }

    /// Credentials built from the form, with the domain normalized.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.email, &self.api_token, &self.domain)
    }

    pub fn reset(&mut self) {
        self.email.clear();
        self.api_token.clear();
        self.domain.clear();
        self.field = LoginField::Email;
        self.input_mode = InputMode::Editing;
        self.show_token = false;
        self.email_error = None;
        self.token_error = None;
        self.domain_error = None;
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::ApiToken,
            LoginField::ApiToken => LoginField::Domain,
            LoginField::Domain => LoginField::Email,
        };
    }

    fn previous_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Domain,
            LoginField::ApiToken => LoginField::Email,
            LoginField::Domain => LoginField::ApiToken,
        };
    }

    fn field_value_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::ApiToken => &mut self.api_token,
            LoginField::Domain => &mut self.domain,
        }
    }

    fn clear_field_error(&mut self) {
        match self.field {
            LoginField::Email => self.email_error = None,
            LoginField::ApiToken => self.token_error = None,
            LoginField::Domain => self.domain_error = None,
        }
    }

    fn movement(&mut self, key: Key) -> anyhow::Result<EventState> {
        if key == Key::Tab || key == self.key_config.move_down {
            self.next_field();
            return Ok(EventState::Consumed);
        } else if key == Key::BackTab || key == self.key_config.move_up {
            self.previous_field();
            return Ok(EventState::Consumed);
        } else if key == self.key_config.toggle_secret {
            self.show_token = !self.show_token;
            return Ok(EventState::Consumed);
        }
        Ok(EventState::NotConsumed)
    }

    fn normal_mode_key_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if key == self.key_config.edit_mode {
            self.input_mode = InputMode::Editing;
            return Ok(EventState::Consumed);
        }
        self.movement(key)
    }

    fn edit_mode_key_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        match key {
            Key::Char(c) => {
                self.field_value_mut().push(c);
                self.clear_field_error();
                Ok(EventState::Consumed)
            }
            Key::Backspace => {
                self.field_value_mut().pop();
                self.clear_field_error();
                Ok(EventState::Consumed)
            }
            Key::Esc => {
                self.input_mode = InputMode::Normal;
                Ok(EventState::Consumed)
            }
            _ => self.movement(key),
        }
    }
}

impl LoginWidget {
    pub fn draw<B: Backend>(
        &mut self,
        f: &mut Frame<'_, B>,
        session_state: &SessionState,
    ) -> anyhow::Result<()> {
        let signing_in = matches!(session_state, SessionState::Authenticating);

        let area = centered_rect(70, 24, f.size());
        f.render_widget(Clear, area);
        f.render_widget(draw_block_style(true, "Jira Dashboard"), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints(
                [
                    Constraint::Length(1), // subtitle
                    Constraint::Length(3), // email
                    Constraint::Length(1),
                    Constraint::Length(3), // api token
                    Constraint::Length(1),
                    Constraint::Length(3), // domain
                    Constraint::Length(1),
                    Constraint::Length(1), // banner / progress
                    Constraint::Min(1),    // footer help
                ]
                .as_ref(),
            )
            .split(area);

        let subtitle = Paragraph::new("Sign in with your Jira credentials")
            .style(Style::default().add_modifier(Modifier::DIM));
        f.render_widget(subtitle, chunks[0]);

        let email_focused = self.field == LoginField::Email;
        let email_text = if self.email.is_empty() {
            Text::styled(
                "your.email@company.com",
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Text::raw(self.email.as_str())
        };
        let email = Paragraph::new(email_text)
            .block(draw_block_style(email_focused, "Email Address"))
            .wrap(Wrap { trim: true });
        f.render_widget(email, chunks[1]);
        draw_field_error(f, chunks[2], self.email_error);

        let token_focused = self.field == LoginField::ApiToken;
        let token_display = if self.show_token {
            self.api_token.clone()
        } else {
            "\u{2022}".repeat(self.api_token.chars().count())
        };
        let token_text = if self.api_token.is_empty() {
            Text::styled(
                "Your Jira API token",
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Text::raw(token_display.as_str())
        };
        let token = Paragraph::new(token_text)
            .block(draw_block_style(token_focused, "API Token"))
            .wrap(Wrap { trim: true });
        f.render_widget(token, chunks[3]);
        draw_field_error(f, chunks[4], self.token_error);

        let domain_focused = self.field == LoginField::Domain;
        let domain_text = if self.domain.is_empty() {
            Text::styled(
                "company.atlassian.net or just 'company'",
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Text::raw(self.domain.as_str())
        };
        let domain = Paragraph::new(domain_text)
            .block(draw_block_style(domain_focused, "Jira Domain"))
            .wrap(Wrap { trim: true });
        f.render_widget(domain, chunks[5]);
        draw_field_error(f, chunks[6], self.domain_error);

        if signing_in {
            let progress =
                Paragraph::new("Signing in...").style(Style::default().fg(Color::Yellow));
            f.render_widget(progress, chunks[7]);
        } else if let SessionState::Anonymous { error: Some(error) } = session_state {
            let banner = Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(banner, chunks[7]);
        }

        let footer = match self.input_mode {
            InputMode::Normal => Spans::from(vec![
                Span::raw("Press "),
                Span::styled(
                    format!("{}", self.key_config.edit_mode),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" to edit, "),
                Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to switch fields, "),
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to sign in."),
            ]),
            InputMode::Editing => Spans::from(vec![
                Span::raw("Press "),
                Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to stop editing, "),
                Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to switch fields, "),
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" to sign in."),
            ]),
        };
        f.render_widget(
            Paragraph::new(Text::from(footer)).style(Style::default().add_modifier(Modifier::DIM)),
            chunks[8],
        );

        if self.input_mode == InputMode::Editing && !signing_in {
            let (rect, len) = match self.field {
                LoginField::Email => (chunks[1], self.email.chars().count()),
                LoginField::ApiToken => (chunks[3], self.api_token.chars().count()),
                LoginField::Domain => (chunks[5], self.domain.chars().count()),
            };
            f.set_cursor(rect.x + len as u16 + 1, rect.y + 1);
        }

        Ok(())
    }
}

fn draw_field_error<B: Backend>(
    f: &mut Frame<'_, B>,
    rect: tui::layout::Rect,
    error: Option<&'static str>,
) {
    if let Some(error) = error {
        let line = Paragraph::new(error).style(Style::default().fg(Color::Red));
        f.render_widget(line, rect);
    }
}

impl Component for LoginWidget {
    fn commands(&self, _out: &mut Vec<CommandInfo>) {}

    fn event(&mut self, key: Key) -> anyhow::Result<EventState> {
        match self.input_mode {
            InputMode::Normal => self.normal_mode_key_event(key),
            InputMode::Editing => self.edit_mode_key_event(key),
        }
    }
}
