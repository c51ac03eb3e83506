use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::jira::auth::{authenticate_user, Credentials, UserSummary};
use crate::jira::client::ApiClient;

/// The one durable record: who is signed in and with which credentials.
/// Written at login success, erased at logout, read once at startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user: UserSummary,
    pub credentials: Credentials,
}

/// Exactly one of these holds at any time. `error` only exists while
/// anonymous; an authenticated session has no error to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous {
        error: Option<String>,
    },
    Authenticating,
    Authenticated {
        user: UserSummary,
        credentials: Credentials,
    },
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoginStarted,
    LoginSucceeded {
        user: UserSummary,
        credentials: Credentials,
    },
    LoginFailed {
        message: String,
    },
    LoggedOut,
    ErrorCleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(UserSummary),
    Failure(String),
}

pub struct SessionStore {
    state: SessionState,
    record_file: PathBuf,
}

impl SessionStore {
    /// Rehydrate from the record file. A malformed record is deleted and
    /// treated as "no session" rather than surfaced as an error.
    pub fn init(record_file: PathBuf) -> SessionStore {
        let state = match fs::read_to_string(&record_file) {
            Ok(raw) => match serde_json::from_str::<SessionRecord>(&raw) {
                Ok(record) => SessionState::Authenticated {
                    user: record.user,
                    credentials: record.credentials,
                },
                Err(err) => {
                    debug!("discarding corrupt session record: {}", err);
                    let _ = fs::remove_file(&record_file);
                    SessionState::Anonymous { error: None }
                }
            },
            Err(_) => SessionState::Anonymous { error: None },
        };

        SessionStore { state, record_file }
    }

    /// The single transition function. Persistence side effects happen
    /// here so no caller can leave the record out of sync with the state.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoginStarted => {
                self.state = SessionState::Authenticating;
            }
            SessionEvent::LoginSucceeded { user, credentials } => {
                self.persist(&SessionRecord {
                    user: user.clone(),
                    credentials: credentials.clone(),
                });
                self.state = SessionState::Authenticated { user, credentials };
            }
            SessionEvent::LoginFailed { message } => {
                self.state = SessionState::Anonymous {
                    error: Some(message),
                };
            }
            SessionEvent::LoggedOut => {
                self.erase();
                self.state = SessionState::Anonymous { error: None };
            }
            SessionEvent::ErrorCleared => {
                if let SessionState::Anonymous { error } = &mut self.state {
                    *error = None;
                }
            }
        }
    }

    /// Run the login round-trip against the backend. All backend and
    /// transport failures come back as `LoginOutcome::Failure` and are
    /// mirrored into the anonymous error state; nothing escapes.
    pub async fn login(&mut self, client: &ApiClient, credentials: Credentials) -> LoginOutcome {
        self.apply(SessionEvent::LoginStarted);

        match authenticate_user(client, &credentials).await {
            Ok(response) if response.success => {
                let user = response.user.unwrap_or_default();
                self.apply(SessionEvent::LoginSucceeded {
                    user: user.clone(),
                    credentials,
                });
                LoginOutcome::Success(user)
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "Authentication failed".to_string());
                self.apply(SessionEvent::LoginFailed {
                    message: message.clone(),
                });
                LoginOutcome::Failure(message)
            }
            Err(err) => {
                let message = err.to_string();
                self.apply(SessionEvent::LoginFailed {
                    message: message.clone(),
                });
                LoginOutcome::Failure(message)
            }
        }
    }

    pub fn logout(&mut self) {
        self.apply(SessionEvent::LoggedOut);
    }

    pub fn clear_error(&mut self) {
        self.apply(SessionEvent::ErrorCleared);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self.state, SessionState::Authenticating)
    }

    pub fn user(&self) -> Option<&UserSummary> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match &self.state {
            SessionState::Authenticated { credentials, .. } => Some(credentials),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Anonymous { error } => error.as_deref(),
            _ => None,
        }
    }

    fn persist(&self, record: &SessionRecord) {
        let write = || -> anyhow::Result<()> {
            if let Some(parent) = self.record_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.record_file, serde_json::to_string(record)?)?;
            Ok(())
        };
        if let Err(err) = write() {
            warn!("unable to persist session record: {}", err);
        }
    }

    fn erase(&self) {
        if let Err(err) = fs::remove_file(&self.record_file) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("unable to erase session record: {}", err);
            }
        }
    }
}
