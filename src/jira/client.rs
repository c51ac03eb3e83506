use std::fmt;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::auth::Credentials;

pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Normalized failure shape for every backend call. Non-2xx statuses,
/// transport failures and malformed payloads all collapse into this one
/// type so the rest of the app only handles a single error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub code: Option<String>,
}

impl ApiError {
    pub fn network() -> Self {
        Self {
            message: "Unable to connect to server. Please check your connection.".to_string(),
            status: 0,
            code: Some(NETWORK_ERROR.to_string()),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "An unexpected error occurred".to_string()
        } else {
            message
        };
        Self {
            message,
            status: 0,
            code: Some(UNKNOWN_ERROR.to_string()),
        }
    }

    /// Non-2xx responses prefer the server-supplied message and machine
    /// readable error code, falling back to a generic status line.
    pub fn from_status(status: StatusCode, body: Option<&Value>) -> Self {
        let message = body
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
        let code = body
            .and_then(|body| body.get("error_code"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            message,
            status: status.as_u16(),
            code,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::network()
        } else {
            ApiError::unknown(err.to_string())
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let header_content_type = HeaderValue::from_static("application/json");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, header_content_type.clone());
        headers.insert(ACCEPT, header_content_type);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single entry point for backend calls. The credentials ride along as
    /// the JSON body on every authenticated endpoint; there is no session
    /// token scheme on this backend.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: Option<&Credentials>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(credentials) = body {
            request = request.json(credentials);
        }

        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let raw = response.text().await.map_err(ApiError::from_transport)?;
        debug!("api response status {} body {}", status, raw);

        let parsed: Option<Value> = serde_json::from_str(&raw).ok();
        if !status.is_success() {
            return Err(ApiError::from_status(status, parsed.as_ref()));
        }

        match parsed {
            Some(value) => {
                serde_json::from_value(value).map_err(|err| ApiError::unknown(err.to_string()))
            }
            None => Err(ApiError::unknown("invalid JSON in response body")),
        }
    }

    /// Connectivity probe against the backend root; any 2xx body counts.
    pub async fn probe(&self) -> Result<(), ApiError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::from_status(response.status(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn status_error_prefers_server_message_and_code() {
        let body = json!({"message": "Invalid API token", "error_code": "AUTH_FAILED"});
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, Some(&body));
        assert_eq!(err.message, "Invalid API token");
        assert_eq!(err.status, 401);
        assert_eq!(err.code.as_deref(), Some("AUTH_FAILED"));
    }

    #[test]
    fn status_error_falls_back_to_generic_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.message, "HTTP error 500");
        assert_eq!(err.status, 500);
        assert!(err.code.is_none());

        let body = json!({"detail": "not the field we look for"});
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, Some(&body));
        assert_eq!(err.message, "HTTP error 502");
    }

    #[test]
    fn network_error_shape() {
        let err = ApiError::network();
        assert_eq!(err.status, 0);
        assert_eq!(err.code.as_deref(), Some(super::NETWORK_ERROR));
        assert_eq!(
            err.to_string(),
            "Unable to connect to server. Please check your connection."
        );
    }

    #[test]
    fn unknown_error_never_has_an_empty_message() {
        let err = ApiError::unknown("");
        assert_eq!(err.message, "An unexpected error occurred");
        assert_eq!(err.code.as_deref(), Some(super::UNKNOWN_ERROR));
    }
}
