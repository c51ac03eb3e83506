use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

const LOGIN_PATH: &str = "/api/auth/login";

/// The email/API-token/domain triple the backend re-sends to Jira on the
/// user's behalf. Built once at login submission and immutable afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub api_token: String,
    pub domain: String,
}

impl Credentials {
    pub fn new(email: &str, api_token: &str, domain: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            api_token: api_token.trim().to_string(),
            domain: normalize_domain(domain),
        }
    }
}

/// Expand shorthand Jira domains. A bare site name becomes a full
/// `*.atlassian.net` URL, a schemeless host gets `https://`, and anything
/// already carrying a scheme is used as given.
pub fn normalize_domain(raw: &str) -> String {
    let domain = raw.trim();
    if domain.starts_with("http") {
        domain.to_string()
    } else if domain.contains('.') {
        format!("https://{}", domain)
    } else {
        format!("https://{}.atlassian.net", domain)
    }
}

pub fn email_is_valid(email: &str) -> bool {
    let email = email.trim();
    let (local, host) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || local.contains(' ') || host.contains(' ') {
        return false;
    }
    match host.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Whatever the backend knows about the logged-in user. The shape is not
/// validated beyond optional field access.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSummary {
    pub display_name: Option<String>,
    pub account_id: Option<String>,
    pub email: Option<String>,
}

impl UserSummary {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("User")
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub success: bool,
    pub user: Option<UserSummary>,
    pub message: Option<String>,
}

pub async fn authenticate_user(
    client: &ApiClient,
    credentials: &Credentials,
) -> Result<AuthResponse, ApiError> {
    debug!("authenticating {} against {}", credentials.email, credentials.domain);
    client
        .request(LOGIN_PATH, Method::POST, Some(credentials))
        .await
}
