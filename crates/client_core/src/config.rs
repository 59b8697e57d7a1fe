use std::{collections::HashMap, fs, path::Path, time::Duration};

use url::Url;

use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    /// Base for `/images/...` paths. Falls back to `api_url`.
    pub image_base_url: Option<String>,
    pub access_token: Option<String>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5005".into(),
            image_base_url: None,
            access_token: None,
            page_size: 10,
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn image_base(&self) -> &str {
        self.image_base_url.as_deref().unwrap_or(&self.api_url)
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat `key = "value"` file at `path`, then environment.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
            if let Some(v) = file_cfg.get("image_base_url") {
                settings.image_base_url = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("access_token") {
                settings.access_token = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("page_size").and_then(|v| v.parse().ok()) {
                settings.page_size = v;
            }
            if let Some(v) = file_cfg
                .get("request_timeout_secs")
                .and_then(|v| v.parse().ok())
            {
                settings.request_timeout_secs = v;
            }
        }
    }

    if let Some(v) = env("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("IMAGE_BASE_URL") {
        settings.image_base_url = Some(v);
    }

    if let Some(v) = env("ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }
    if let Some(v) = env("APP__ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }

    if let Some(v) = env("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings.page_size = settings.page_size.max(1);
    settings
}

/// Trims whitespace and trailing slashes so paths can be appended with `format!`.
pub fn normalize_api_url(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SettingsError::EmptyApiUrl);
    }

    Url::parse(trimmed).map_err(|err| SettingsError::InvalidApiUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
