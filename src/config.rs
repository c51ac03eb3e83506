use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::event::key::Key;

use serde::Deserialize;

#[cfg(test)]
use serde::Serialize;

/// Environment override for the backend base URL.
pub const SERVER_URL_ENV: &str = "JIRADASH_SERVER_URL";

const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub key_config: KeyConfig,
    #[serde(default)]
    pub server_config: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[cfg_attr(test, derive(Serialize))]
pub struct ServerConfig {
    /// Base URL of the dashboard backend that proxies Jira.
    pub base_url: String,
    /// Where the authenticated session record is persisted. Defaults to
    /// `jira_auth.json` in the config directory.
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[cfg_attr(test, derive(Serialize))]
#[serde(default)]
pub struct KeyConfig {
    pub scroll_up: Key,
    pub scroll_down: Key,
    pub scroll_up_multiple_lines: Key,
    pub scroll_down_multiple_lines: Key,
    pub scroll_to_top: Key,
    pub scroll_to_bottom: Key,
    pub move_up: Key,
    pub move_down: Key,
    pub enter: Key,
    pub esc: Key,
    pub exit: Key,
    pub quit: Key,
    pub edit_mode: Key,
    pub filter: Key,
    pub retry: Key,
    pub logout: Key,
    pub open_help: Key,
    pub toggle_secret: Key,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            scroll_up: Key::Char('k'),
            scroll_down: Key::Char('j'),
            scroll_up_multiple_lines: Key::Ctrl('u'),
            scroll_down_multiple_lines: Key::Ctrl('d'),
            scroll_to_top: Key::Char('g'),
            scroll_to_bottom: Key::Char('G'),
            move_up: Key::Up,
            move_down: Key::Down,
            enter: Key::Enter,
            esc: Key::Esc,
            exit: Key::Ctrl('c'),
            quit: Key::Char('q'),
            edit_mode: Key::Char('e'),
            filter: Key::Char('/'),
            retry: Key::Char('r'),
            logout: Key::Char('o'),
            open_help: Key::Char('?'),
            toggle_secret: Key::Ctrl('t'),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let base_url = match env::var(SERVER_URL_ENV) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => DEFAULT_SERVER_URL.to_string(),
        };
        Self {
            base_url,
            session_file: None,
        }
    }
}

impl Config {
    /// Load the config file if one exists; fall back to defaults otherwise.
    /// The `JIRADASH_SERVER_URL` environment variable wins over the file.
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_dir().join("config.toml"),
        };

        let mut config = if path.is_file() {
            let raw = fs::read_to_string(&path)?;
            toml::from_str(&raw)?
        } else {
            Config::default()
        };

        if let Ok(url) = env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server_config.base_url = url;
            }
        }

        Ok(config)
    }

    pub fn session_file(&self) -> PathBuf {
        match &self.server_config.session_file {
            Some(path) => path.clone(),
            None => config_dir().join("jira_auth.json"),
        }
    }
}

fn config_dir() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("jiradash")
}
