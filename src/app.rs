use log::{info, warn};
use tui::{backend::Backend, Frame};

use crate::config::Config;
use crate::event::key::Key;
use crate::jira::client::ApiClient;
use crate::jira::projects::{fetch_project_details, fetch_user_projects, Project};
use crate::session::{LoginOutcome, SessionStore};
use crate::widgets::{
    error::ErrorComponent, help::HelpWidget, login::LoginWidget,
    project_detail::ProjectDetailWidget, projects::ProjectsWidget, Component, EventState,
    InputMode,
};

#[derive(Debug, PartialEq, Eq)]
pub enum Focus {
    Login,
    Projects,
    ProjectDetail,
}

pub struct App {
    pub focus: Focus,
    client: ApiClient,
    pub session: SessionStore,
    pub login: LoginWidget,
    pub projects: ProjectsWidget,
    pub project_detail: ProjectDetailWidget,
    help: HelpWidget,
    pub config: Config,
    pub error: ErrorComponent,
}

impl App {
    pub async fn new(config: Config) -> anyhow::Result<App> {
        let client = ApiClient::new(&config.server_config.base_url)?;
        let session = SessionStore::init(config.session_file());

        match client.probe().await {
            Ok(()) => info!("backend reachable at {}", client.base_url()),
            Err(err) => warn!("backend probe failed: {}", err),
        }

        let key_config = config.key_config.clone();
        let mut app = App {
            focus: Focus::Login,
            client,
            session,
            login: LoginWidget::new(key_config.clone()),
            projects: ProjectsWidget::new(key_config.clone()),
            project_detail: ProjectDetailWidget::new(key_config.clone()),
            help: HelpWidget::new(key_config.clone()),
            error: ErrorComponent::new(key_config),
            config,
        };

        // a rehydrated session lands straight on the dashboard
        if app.session.is_authenticated() {
            app.focus = Focus::Projects;
            app.load_projects().await;
        }

        Ok(app)
    }

    /// Fetch the project list for the current credentials. Runs on every
    /// credentials change (initial mount, login) and on manual retry.
    pub async fn load_projects(&mut self) {
        let credentials = match self.session.credentials() {
            Some(credentials) => credentials.clone(),
            None => return,
        };

        self.projects.set_loading();
        match fetch_user_projects(&self.client, &credentials).await {
            Ok(response) if response.success => {
                self.projects
                    .set_projects(response.projects.unwrap_or_default());
            }
            Ok(response) => {
                self.projects.set_failed(
                    response
                        .message
                        .unwrap_or_else(|| "Failed to load projects".to_string()),
                );
            }
            Err(err) => self.projects.set_failed(err.to_string()),
        }
    }

    /// Open the detail popup for a project and fetch its extended detail.
    /// The selection renders immediately; the fetch result is folded in
    /// tagged with the key it was issued for.
    pub async fn select_project(&mut self, project: Project) {
        let credentials = match self.session.credentials() {
            Some(credentials) => credentials.clone(),
            None => return,
        };
        let project_key = project.key.clone();

        self.project_detail.select(project);
        self.focus = Focus::ProjectDetail;

        let outcome = match fetch_project_details(&self.client, &project_key, &credentials).await {
            Ok(response) if response.success => match response.project {
                Some(detail) => Ok(detail),
                None => Err("Failed to load project details".to_string()),
            },
            Ok(response) => Err(response
                .message
                .unwrap_or_else(|| "Failed to load project details".to_string())),
            Err(err) => Err(err.to_string()),
        };
        self.project_detail.apply_result(&project_key, outcome);
    }

    async fn submit_login(&mut self) {
        // the submit control is disabled while a login is in flight
        if self.session.is_authenticating() {
            return;
        }
        if !self.login.validate() {
            return;
        }

        let credentials = self.login.credentials();
        match self.session.login(&self.client, credentials).await {
            LoginOutcome::Success(user) => {
                info!("signed in as {}", user.display_name());
                self.login.reset();
                self.focus = Focus::Projects;
                self.load_projects().await;
            }
            LoginOutcome::Failure(message) => {
                // already mirrored into the session error state for the banner
                warn!("login failed: {}", message);
            }
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.projects = ProjectsWidget::new(self.config.key_config.clone());
        self.project_detail.deselect();
        self.login.reset();
        self.focus = Focus::Login;
    }

    pub fn draw<B: Backend>(&mut self, f: &mut Frame<'_, B>) -> anyhow::Result<()> {
        match self.focus {
            Focus::Login => self.login.draw(f, self.session.state())?,
            Focus::Projects | Focus::ProjectDetail => {
                self.projects.draw(f, self.session.user())?;
                self.project_detail.draw(f)?;
            }
        }

        self.help.draw(f)?;
        self.error.draw(f)?;
        Ok(())
    }

    pub async fn event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if self.error.event(key)?.is_consumed() {
            return Ok(EventState::Consumed);
        }
        if self.help.event(key)?.is_consumed() {
            return Ok(EventState::Consumed);
        }
        if key == self.config.key_config.open_help {
            self.help.show()?;
            return Ok(EventState::Consumed);
        }

        match self.focus {
            Focus::Login => self.login_event(key).await,
            Focus::Projects => self.projects_event(key).await,
            Focus::ProjectDetail => self.project_detail_event(key),
        }
    }

    async fn login_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        // typing again dismisses a lingering login error
        if self.login.is_editing()
            && matches!(key, Key::Char(_) | Key::Backspace)
            && self.session.error().is_some()
        {
            self.session.clear_error();
        }

        if self.login.event(key)?.is_consumed() {
            return Ok(EventState::Consumed);
        }

        if key == self.config.key_config.enter {
            self.submit_login().await;
            return Ok(EventState::Consumed);
        }

        Ok(EventState::NotConsumed)
    }

    async fn projects_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if self.projects.event(key)?.is_consumed() {
            return Ok(EventState::Consumed);
        }

        if key == self.config.key_config.enter {
            if let Some(project) = self.projects.selected().cloned() {
                self.projects.input_mode = InputMode::Normal;
                self.select_project(project).await;
            }
            return Ok(EventState::Consumed);
        }
        if key == self.config.key_config.retry && self.projects.is_failed() {
            self.load_projects().await;
            return Ok(EventState::Consumed);
        }
        if key == self.config.key_config.logout {
            self.logout();
            return Ok(EventState::Consumed);
        }
        if key == self.config.key_config.esc && !self.projects.search_term().is_empty() {
            self.projects.clear_filter();
            return Ok(EventState::Consumed);
        }

        Ok(EventState::NotConsumed)
    }

    fn project_detail_event(&mut self, key: Key) -> anyhow::Result<EventState> {
        if self.project_detail.event(key)?.is_consumed() {
            return Ok(EventState::Consumed);
        }

        if key == self.config.key_config.esc {
            self.project_detail.deselect();
            self.focus = Focus::Projects;
            return Ok(EventState::Consumed);
        }

        Ok(EventState::NotConsumed)
    }
}
