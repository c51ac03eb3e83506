use std::collections::HashMap;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::{
    config::KeyConfig,
    event::key::Key,
    jira::auth::UserSummary,
    jira::projects::Project,
};

use super::{commands::CommandInfo, draw_block_style, draw_highlight_style, Component, EventState, InputMode};

#[derive(Debug, Clone, Copy)]
pub enum Action {
    Down(usize),
    Up(usize),
    Bottom,
    Top,
}

/// Fetch lifecycle of the project collection. The search filter lives
/// next to it but never touches this state or the loaded list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectsLoad {
    Loading,
    Ready(Vec<Project>),
    Failed(String),
}

pub struct ProjectsWidget {
    load: ProjectsLoad,
    filter: String,
    pub input_mode: InputMode,
    state: ListState,
    pub key_mappings: HashMap<Key, Action>,
    key_config: KeyConfig,
}

pub fn welcome_line(user: Option<&UserSummary>) -> String {
    let name = user.map(UserSummary::display_name).unwrap_or("User");
    format!("Welcome, {}!", name)
}

impl ProjectsWidget {
    pub fn new(key_config: KeyConfig) -> Self {
        let key_mappings = {
            let mut map = HashMap::new();
            map.insert(Key::Down, Action::Down(1));
            map.insert(Key::Up, Action::Up(1));

            map.insert(key_config.scroll_down, Action::Down(1));
            map.insert(key_config.scroll_up, Action::Up(1));
            map.insert(key_config.scroll_down_multiple_lines, Action::Down(10));
            map.insert(key_config.scroll_up_multiple_lines, Action::Up(10));
            map.insert(key_config.scroll_to_bottom, Action::Bottom);
            map.insert(key_config.scroll_to_top, Action::Top);
            map
        };

        Self {
            load: ProjectsLoad::Loading,
            filter: String::new(),
            input_mode: InputMode::Normal,
            state: ListState::default(),
            key_mappings,
            key_config,
        }
    }

    pub fn load(&self) -> &ProjectsLoad {
        &self.load
    }

    pub fn set_loading(&mut self) {
        self.load = ProjectsLoad::Loading;
        self.state.select(None);
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.load = ProjectsLoad::Ready(projects);
        self.reselect();
    }

    pub fn set_failed(&mut self, message: String) {
        self.load = ProjectsLoad::Failed(message);
        self.state.select(None);
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.load, ProjectsLoad::Failed(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.load {
            ProjectsLoad::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.filter
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.reselect();
    }

    /// The loaded list in backend order, when it is loaded.
    pub fn projects(&self) -> Option<&[Project]> {
        match &self.load {
            ProjectsLoad::Ready(projects) => Some(projects),
            _ => None,
        }
    }

    /// Pure, order-preserving view of the loaded list under the current
    /// search term. Re-derived on demand; the source list never changes.
    pub fn filtered(&self) -> Vec<&Project> {
        match &self.load {
            ProjectsLoad::Ready(projects) => projects
                .iter()
                .filter(|project| project.matches(&self.filter))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn selected(&self) -> Option<&Project> {
        let filtered = self.filtered();
        match self.state.selected() {
            Some(i) => filtered.get(i).copied(),
            None => None,
        }
    }

    fn reselect(&mut self) {
        if self.filtered().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self, line: usize) {
        let len = self.filtered().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => Some((i + line).min(len - 1)),
            None => Some(0),
        };
        self.state.select(i);
    }

    pub fn previous(&mut self, line: usize) {
        let i = match self.state.selected() {
            Some(i) if i <= line => Some(0),
            Some(i) => Some(i - line),
            None => None,
        };
        self.state.select(i);
    }

    pub fn go_to_top(&mut self) {
        if self.filtered().is_empty() {
            return;
        }
        self.state.select(Some(0));
    }

    pub fn go_to_bottom(&mut self) {
        let len = self.filtered().len();
        if len == 0 {
            return;
        }
        self.state.select(Some(len - 1));
    }

    fn count_line(&self) -> String {
        match &self.load {
            ProjectsLoad::Loading => "Loading your Jira projects...".to_string(),
            ProjectsLoad::Failed(_) => String::new(),
            ProjectsLoad::Ready(projects) => {
                if self.filter.is_empty() {
                    let plural = if projects.len() == 1 { "" } else { "s" };
                    format!("You have access to {} project{}", projects.len(), plural)
                } else {
                    format!(
                        "{} of {} projects",
                        self.filtered().len(),
                        projects.len()
                    )
                }
            }
        }
    }

    fn normal_mode_key_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if key == self.key_config.filter {
            self.input_mode = InputMode::Editing;
            return Ok(EventState::Consumed);
        }
        if let Some(action) = self.key_mappings.get(&key) {
            use Action::*;
            match *action {
                Down(line) => self.next(line),
                Up(line) => self.previous(line),
                Bottom => self.go_to_bottom(),
                Top => self.go_to_top(),
            }
            return Ok(EventState::Consumed);
        }
        Ok(EventState::NotConsumed)
    }

    fn edit_mode_key_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        match key {
            Key::Char(c) => {
                self.filter.push(c);
                self.reselect();
                Ok(EventState::Consumed)
            }
            Key::Backspace => {
                self.filter.pop();
                self.reselect();
                Ok(EventState::Consumed)
            }
            Key::Esc => {
                self.input_mode = InputMode::Normal;
                Ok(EventState::Consumed)
            }
            Key::Down | Key::Up => {
                // allow list movement without leaving the search bar
                if key == Key::Down {
                    self.next(1)
                } else {
                    self.previous(1)
                }
                Ok(EventState::Consumed)
            }
            _ => Ok(EventState::NotConsumed),
        }
    }
}

impl ProjectsWidget {
    pub fn draw<B: Backend>(
        &mut self,
        f: &mut Frame<'_, B>,
        user: Option<&UserSummary>,
    ) -> anyhow::Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Length(3),
                    Constraint::Min(1),
                ]
                .as_ref(),
            )
            .split(f.size());

        let header = Text::from(vec![
            Spans::from(Span::styled(
                welcome_line(user),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Spans::from(Span::styled(
                self.count_line(),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ]);
        f.render_widget(Paragraph::new(header), chunks[0]);

        let searching = self.input_mode == InputMode::Editing;
        let search_text = if self.filter.is_empty() && !searching {
            Text::styled(
                "Search projects by name, key, or description...",
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Text::raw(self.filter.as_str())
        };
        let search = Paragraph::new(search_text)
            .style(if searching {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            })
            .block(draw_block_style(searching, "Search"));
        f.render_widget(search, chunks[1]);
        if searching {
            f.set_cursor(
                chunks[1].x + self.filter.chars().count() as u16 + 1,
                chunks[1].y + 1,
            );
        }

        match &self.load {
            ProjectsLoad::Loading => self.draw_message(
                f,
                chunks[2],
                "Fetching your projects from Jira...".to_string(),
                Style::default(),
            ),
            ProjectsLoad::Failed(message) => {
                let text = format!(
                    "Failed to load projects\n{}\nPress {} to try again, {} to sign out.",
                    message, self.key_config.retry, self.key_config.logout
                );
                self.draw_message(f, chunks[2], text, Style::default().fg(Color::Red))
            }
            ProjectsLoad::Ready(_) => self.draw_list(f, chunks[2]),
        }

        Ok(())
    }

    fn draw_message<B: Backend>(&self, f: &mut Frame<'_, B>, rect: Rect, text: String, style: Style) {
        let paragraph = Paragraph::new(text)
            .style(style)
            .block(draw_block_style(false, "Projects"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, rect);
    }

    fn draw_list<B: Backend>(&mut self, f: &mut Frame<'_, B>, rect: Rect) {
        let filtered = self.filtered();
        if filtered.is_empty() {
            let text = if self.filter.is_empty() {
                "No projects found\nIt looks like you don't have access to any Jira projects yet."
                    .to_string()
            } else {
                format!(
                    "No matching projects\nTry adjusting your search terms or press {} to clear the search.",
                    self.key_config.esc
                )
            };
            self.draw_message(f, rect, text, Style::default());
            return;
        }

        let list_items: Vec<ListItem> = filtered
            .iter()
            .map(|project| {
                let description = project
                    .description
                    .as_deref()
                    .unwrap_or("No description available");
                ListItem::new(vec![
                    Spans::from(vec![
                        Span::styled(
                            project.name.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format!("  ({})", project.key)),
                    ]),
                    Spans::from(Span::styled(
                        format!("    {}", description),
                        Style::default().add_modifier(Modifier::DIM),
                    )),
                ])
            })
            .collect();

        let list = List::new(list_items)
            .block(draw_block_style(!self.is_failed(), "Projects"))
            .highlight_style(draw_highlight_style());

        f.render_stateful_widget(list, rect, &mut self.state);
    }
}

impl Component for ProjectsWidget {
    fn commands(&self, _out: &mut Vec<CommandInfo>) {}

    fn event(&mut self, key: Key) -> anyhow::Result<EventState> {
        match self.input_mode {
            InputMode::Normal => self.normal_mode_key_event(key),
            InputMode::Editing => self.edit_mode_key_event(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{welcome_line, ProjectsLoad, ProjectsWidget};
    use crate::config::KeyConfig;
    use crate::event::key::Key;
    use crate::jira::auth::UserSummary;
    use crate::jira::projects::Project;
    use crate::widgets::{Component, InputMode};

    fn project(name: &str, key: &str, description: Option<&str>) -> Project {
        Project {
            id: key.to_lowercase(),
            key: key.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            project_type: None,
            category: None,
            lead: None,
            created_date: None,
            avatar_urls: None,
            issue_types: None,
        }
    }

    fn loaded_widget() -> ProjectsWidget {
        let mut w = ProjectsWidget::new(KeyConfig::default());
        w.set_projects(vec![
            project("Platform Core", "PLAT", Some("Shared infrastructure")),
            project("Billing", "BILL", None),
            project("Mobile App", "MOB", Some("The platform client")),
        ]);
        w
    }

    fn type_filter(w: &mut ProjectsWidget, term: &str) {
        w.input_mode = InputMode::Editing;
        for c in term.chars() {
            w.event(Key::Char(c)).unwrap();
        }
    }

    #[test]
    fn empty_term_yields_the_full_list_in_order() {
        let w = loaded_widget();
        let keys: Vec<&str> = w.filtered().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["PLAT", "BILL", "MOB"]);
    }

    #[test]
    fn filter_is_an_order_preserving_subsequence() {
        let mut w = loaded_widget();
        type_filter(&mut w, "platform");
        let keys: Vec<&str> = w.filtered().iter().map(|p| p.key.as_str()).collect();
        // matches name of PLAT and description of MOB, source order kept
        assert_eq!(keys, vec!["PLAT", "MOB"]);
    }

    #[test]
    fn filter_matches_key_case_insensitively() {
        let mut w = loaded_widget();
        type_filter(&mut w, "bill");
        let keys: Vec<&str> = w.filtered().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["BILL"]);
    }

    #[test]
    fn filtering_never_mutates_the_source_list() {
        let mut w = loaded_widget();
        type_filter(&mut w, "zzz");
        assert!(w.filtered().is_empty());
        w.clear_filter();
        assert_eq!(w.projects().unwrap().len(), 3);
        let keys: Vec<&str> = w.filtered().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["PLAT", "BILL", "MOB"]);
    }

    #[test]
    fn selection_follows_the_filtered_view() {
        let mut w = loaded_widget();
        assert_eq!(w.selected().unwrap().key, "PLAT");

        w.next(1);
        assert_eq!(w.selected().unwrap().key, "BILL");

        type_filter(&mut w, "mob");
        assert_eq!(w.selected().unwrap().key, "MOB");
    }

    #[test]
    fn retry_cycle_leaves_no_residual_error() {
        let mut w = ProjectsWidget::new(KeyConfig::default());
        w.set_failed("HTTP error 500".to_string());
        assert!(w.is_failed());
        assert_eq!(w.error_message(), Some("HTTP error 500"));

        // the retry path: back to loading, then ready
        w.set_loading();
        assert_eq!(w.load(), &ProjectsLoad::Loading);
        w.set_projects(vec![project("Platform Core", "PLAT", None)]);
        assert!(w.error_message().is_none());
        assert_eq!(w.selected().unwrap().key, "PLAT");
    }

    #[test]
    fn welcome_line_uses_the_display_name_with_fallback() {
        let ann = UserSummary {
            display_name: Some("Ann".to_string()),
            ..Default::default()
        };
        assert_eq!(welcome_line(Some(&ann)), "Welcome, Ann!");
        assert_eq!(welcome_line(None), "Welcome, User!");
        assert_eq!(welcome_line(Some(&UserSummary::default())), "Welcome, User!");
    }

    #[test]
    fn count_line_tracks_filtering() {
        let mut w = loaded_widget();
        assert_eq!(w.count_line(), "You have access to 3 projects");
        type_filter(&mut w, "platform");
        assert_eq!(w.count_line(), "2 of 3 projects");

        let mut single = ProjectsWidget::new(KeyConfig::default());
        single.set_projects(vec![project("Solo", "SOLO", None)]);
        assert_eq!(single.count_line(), "You have access to 1 project");
    }
}
