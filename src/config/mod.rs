use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub email: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Last-used grid kind: one column per staff member for a single day,
    /// instead of one column per weekday
    #[serde(default)]
    pub day_grid: bool,
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            email: String::new(),
            api_key: None,
            font_scale: 1.0,
            currency: default_currency(),
            day_grid: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.server_url.is_empty() && !self.email.is_empty() && self.api_key.is_some()
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "salondesk", "salondesk")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Root of the backend's REST API. Accepts a bare host or a full URL and
    /// strips any trailing path.
    pub fn base_url(&self) -> String {
        let trimmed = self.server_url.trim();
        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            ("http", rest)
        } else {
            ("https", trimmed)
        };
        let host = rest.trim_end_matches('/').split('/').next().unwrap_or(rest);

        format!("{}://{}/api/v1", scheme, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_normalizes_host_input() {
        let mut config = Config::default();

        config.server_url = "books.example.com".to_string();
        assert_eq!(config.base_url(), "https://books.example.com/api/v1");

        config.server_url = "https://books.example.com/dashboard/".to_string();
        assert_eq!(config.base_url(), "https://books.example.com/api/v1");

        config.server_url = "http://localhost:8700".to_string();
        assert_eq!(config.base_url(), "http://localhost:8700/api/v1");
    }
}
