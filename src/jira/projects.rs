use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::auth::Credentials;
use super::client::{ApiClient, ApiError};

const PROJECTS_PATH: &str = "/api/projects";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectLead {
    pub display_name: String,
    pub email: Option<String>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IssueType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
}

/// Project summary as returned by the list endpoint. Backend order is
/// preserved wherever these are held; `id` is the display key.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub project_type: Option<String>,
    pub category: Option<String>,
    pub lead: Option<ProjectLead>,
    pub created_date: Option<String>,
    pub avatar_urls: Option<HashMap<String, String>>,
    pub issue_types: Option<Vec<IssueType>>,
}

impl Project {
    /// Case-insensitive substring match over name, key and description.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.key.to_lowercase().contains(&term)
            || self
                .description
                .as_ref()
                .map(|description| description.to_lowercase().contains(&term))
                .unwrap_or(false)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        let urls = self.avatar_urls.as_ref()?;
        urls.get("48x48").or_else(|| urls.get("24x24")).map(String::as_str)
    }

    /// Two-character badge shown when no avatar URL is available.
    pub fn avatar_fallback(&self) -> String {
        let source = if self.key.is_empty() {
            &self.name
        } else {
            &self.key
        };
        let short: String = source.chars().take(2).collect();
        if short.is_empty() {
            "??".to_string()
        } else {
            short
        }
    }
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectComponent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub lead: Option<String>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectVersion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub released: bool,
    pub release_date: Option<String>,
}

/// Superset of the project summary returned by the per-project endpoint.
/// Never cached: re-selecting a project fetches this again.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub components: Option<Vec<ProjectComponent>>,
    pub versions: Option<Vec<ProjectVersion>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProjectsResponse {
    pub success: bool,
    pub projects: Option<Vec<Project>>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProjectDetailResponse {
    pub success: bool,
    pub project: Option<ProjectDetail>,
    pub message: Option<String>,
}

pub async fn fetch_user_projects(
    client: &ApiClient,
    credentials: &Credentials,
) -> Result<ProjectsResponse, ApiError> {
    debug!("fetching projects for {}", credentials.email);
    client
        .request(PROJECTS_PATH, Method::POST, Some(credentials))
        .await
}

pub async fn fetch_project_details(
    client: &ApiClient,
    project_key: &str,
    credentials: &Credentials,
) -> Result<ProjectDetailResponse, ApiError> {
    debug!("fetching project details for {}", project_key);
    let path = format!("{}/{}", PROJECTS_PATH, project_key);
    client.request(&path, Method::POST, Some(credentials)).await
}

/// Human-readable date line for created/release dates. The backend sends
/// either RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
pub fn format_date(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return "Not specified".to_string(),
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.format("%B %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %-d, %Y").to_string();
    }
    "Invalid date".to_string()
}
