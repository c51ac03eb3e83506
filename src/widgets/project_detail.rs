use itertools::Itertools;
use log::debug;
use tui::{
    backend::Backend,
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    config::KeyConfig,
    event::key::Key,
    jira::projects::{format_date, Project, ProjectDetail},
};

use super::{centered_rect, commands::CommandInfo, draw_block_style, Component, EventState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLoad {
    Loading,
    Ready(Box<ProjectDetail>),
    Failed(String),
}

/// Detail popup state. Selection shows the summary immediately; the
/// extended detail arrives (or fails) independently of the list view.
pub struct ProjectDetailWidget {
    selected: Option<Project>,
    detail: Option<DetailLoad>,
    scroll: u16,
    key_config: KeyConfig,
}

impl ProjectDetailWidget {
    pub fn new(key_config: KeyConfig) -> Self {
        Self {
            selected: None,
            detail: None,
            scroll: 0,
            key_config,
        }
    }

    pub fn select(&mut self, project: Project) {
        self.selected = Some(project);
        self.detail = Some(DetailLoad::Loading);
        self.scroll = 0;
    }

    /// Fold a detail response back in. Responses are tagged with the
    /// project key they were fetched for; anything that no longer matches
    /// the current selection is stale and gets dropped.
    pub fn apply_result(&mut self, project_key: &str, outcome: Result<ProjectDetail, String>) {
        let current = self.selected.as_ref().map(|project| project.key.as_str());
        if current != Some(project_key) {
            debug!("dropping stale detail response for {}", project_key);
            return;
        }
        self.detail = Some(match outcome {
            Ok(detail) => DetailLoad::Ready(Box::new(detail)),
            Err(message) => DetailLoad::Failed(message),
        });
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.detail = None;
        self.scroll = 0;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected.as_ref()
    }

    pub fn detail(&self) -> Option<&DetailLoad> {
        self.detail.as_ref()
    }

    fn down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    fn up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

impl ProjectDetailWidget {
    pub fn draw<B: Backend>(&mut self, f: &mut Frame<'_, B>) -> anyhow::Result<()> {
        let project = match &self.selected {
            None => return Ok(()),
            Some(project) => project,
        };

        let title = format!("{} ({})", project.name, project.key);
        let mut lines: Vec<Spans> = Vec::new();

        match project.avatar_url() {
            Some(url) => lines.push(Spans::from(Span::styled(
                format!("Avatar: {}", url),
                Style::default().add_modifier(Modifier::DIM),
            ))),
            None => lines.push(Spans::from(Span::styled(
                format!("[{}]", project.avatar_fallback()),
                Style::default().add_modifier(Modifier::BOLD),
            ))),
        }
        if let Some(issue_types) = &project.issue_types {
            if !issue_types.is_empty() {
                let mut badges = issue_types
                    .iter()
                    .take(4)
                    .map(|issue_type| issue_type.name.as_str())
                    .join(", ");
                if issue_types.len() > 4 {
                    badges.push_str(&format!(" +{} more", issue_types.len() - 4));
                }
                lines.push(Spans::from(format!("Issue Types: {}", badges)));
            }
        }
        lines.push(Spans::default());

        match self.detail.as_ref() {
            None | Some(DetailLoad::Loading) => {
                lines.push(Spans::from(Span::styled(
                    "Loading project details...",
                    Style::default().fg(Color::Yellow),
                )));
            }
            Some(DetailLoad::Failed(message)) => {
                lines.push(Spans::from(Span::styled(
                    "Failed to load details",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                lines.push(Spans::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )));
            }
            Some(DetailLoad::Ready(detail)) => {
                self.detail_lines(detail, &mut lines);
            }
        }

        let area = centered_rect(80, 24, f.size());
        let paragraph = Paragraph::new(Text::from(lines))
            .block(draw_block_style(true, &title))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));

        f.render_widget(Clear, area);
        f.render_widget(paragraph, area);

        Ok(())
    }

    fn detail_lines(&self, detail: &ProjectDetail, lines: &mut Vec<Spans>) {
        let section = |name: &str| {
            Spans::from(Span::styled(
                name.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
        };
        let project = &detail.project;

        lines.push(section("Description"));
        lines.push(Spans::from(
            project
                .description
                .clone()
                .unwrap_or_else(|| "No description available".to_string()),
        ));
        lines.push(Spans::default());

        lines.push(section("Project Information"));
        lines.push(Spans::from(format!(
            "Type: {}",
            project.project_type.as_deref().unwrap_or("Unknown")
        )));
        lines.push(Spans::from(format!(
            "Category: {}",
            project.category.as_deref().unwrap_or("Uncategorized")
        )));
        if project.created_date.is_some() {
            lines.push(Spans::from(format!(
                "Created: {}",
                format_date(project.created_date.as_deref())
            )));
        }
        if let Some(lead) = &project.lead {
            let line = match &lead.email {
                Some(email) => format!("Lead: {} ({})", lead.display_name, email),
                None => format!("Lead: {}", lead.display_name),
            };
            lines.push(Spans::from(line));
        }
        lines.push(Spans::default());

        if let Some(issue_types) = &project.issue_types {
            if !issue_types.is_empty() {
                lines.push(section(&format!("Issue Types ({})", issue_types.len())));
                for issue_type in issue_types {
                    let line = match &issue_type.description {
                        Some(description) => format!("  {}: {}", issue_type.name, description),
                        None => format!("  {}", issue_type.name),
                    };
                    lines.push(Spans::from(line));
                }
                lines.push(Spans::default());
            }
        }

        if let Some(components) = &detail.components {
            if !components.is_empty() {
                lines.push(section(&format!("Components ({})", components.len())));
                for component in components {
                    let mut line = format!("  {}", component.name);
                    if let Some(description) = &component.description {
                        line.push_str(&format!(": {}", description));
                    }
                    if let Some(lead) = &component.lead {
                        line.push_str(&format!(" (Lead: {})", lead));
                    }
                    lines.push(Spans::from(line));
                }
                lines.push(Spans::default());
            }
        }

        if let Some(versions) = &detail.versions {
            if !versions.is_empty() {
                lines.push(section(&format!("Versions ({})", versions.len())));
                for version in versions {
                    let status = if version.released {
                        "Released"
                    } else {
                        "Unreleased"
                    };
                    let mut line = format!("  {} [{}]", version.name, status);
                    if let Some(description) = &version.description {
                        line.push_str(&format!(": {}", description));
                    }
                    if version.release_date.is_some() {
                        line.push_str(&format!(
                            " Release Date: {}",
                            format_date(version.release_date.as_deref())
                        ));
                    }
                    lines.push(Spans::from(line));
                }
            }
        }
    }
}

impl Component for ProjectDetailWidget {
    fn commands(&self, _out: &mut Vec<CommandInfo>) {}

    fn event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if !self.is_open() {
            return Ok(EventState::NotConsumed);
        }
        if key == self.key_config.scroll_down {
            self.down(1);
            return Ok(EventState::Consumed);
        } else if key == self.key_config.scroll_up {
            self.up(1);
            return Ok(EventState::Consumed);
        } else if key == self.key_config.scroll_down_multiple_lines {
            self.down(10);
            return Ok(EventState::Consumed);
        } else if key == self.key_config.scroll_up_multiple_lines {
            self.up(10);
            return Ok(EventState::Consumed);
        }
        Ok(EventState::NotConsumed)
    }
}
