use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{
    DEFAULT_APP_TYPE, DEFAULT_CREATE_TEMPLATE_PATH, DEFAULT_DELETE_TEMPLATE_PATH,
    DEFAULT_MEDIA_DELETE_PATH, DEFAULT_MEDIA_LIST_PATH, DEFAULT_MEDIA_UPLOAD_PATH,
    DEFAULT_MEDIA_USAGE_PATH, DEFAULT_PAGE_SIZE, DEFAULT_TEMPLATES_PATH, DEFAULT_TIMEOUT_SECONDS,
    DEFAULT_UNMATCHED_GROUPS_PATH, DEFAULT_UPDATE_TEMPLATE_PATH,
};
use crate::error::{AdminError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the group backend, e.g. `https://example.org/api/`.
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub unmatched_groups_path: String,
    pub content: ContentConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            unmatched_groups_path: DEFAULT_UNMATCHED_GROUPS_PATH.to_string(),
            content: ContentConfig::default(),
        }
    }
}

/// `[api.content]`: message template and media endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub templates_path: String,
    pub create_template_path: String,
    pub update_template_path: String,
    pub delete_template_path: String,
    /// May contain a `{type}` segment, e.g. `getAllMediaByType/{type}/students/whatsapp_osepa`.
    pub media_list_path: String,
    pub media_upload_path: String,
    /// May contain a `{name}` segment for the media name being checked.
    pub media_usage_path: String,
    pub media_delete_path: String,
    /// Sent as `appType` with every media upload.
    pub app_type: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            templates_path: DEFAULT_TEMPLATES_PATH.to_string(),
            create_template_path: DEFAULT_CREATE_TEMPLATE_PATH.to_string(),
            update_template_path: DEFAULT_UPDATE_TEMPLATE_PATH.to_string(),
            delete_template_path: DEFAULT_DELETE_TEMPLATE_PATH.to_string(),
            media_list_path: DEFAULT_MEDIA_LIST_PATH.to_string(),
            media_upload_path: DEFAULT_MEDIA_UPLOAD_PATH.to_string(),
            media_usage_path: DEFAULT_MEDIA_USAGE_PATH.to_string(),
            media_delete_path: DEFAULT_MEDIA_DELETE_PATH.to_string(),
            app_type: DEFAULT_APP_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Reads the TOML file if it exists, then applies `.env` and process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let mut config = if config_path.exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                AdminError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path.display(),
                    e
                ))
            })?;
            Self::from_toml_str(&config_content)?
        } else if path.is_some() {
            return Err(AdminError::Config(format!(
                "Config file '{}' not found",
                config_path.display()
            )));
        } else {
            Self::default()
        };

        dotenv::dotenv().ok();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = Some(url);
        }
        if let Some(path) = lookup("UNMATCHED_GROUPS_PATH").filter(|v| !v.trim().is_empty()) {
            self.api.unmatched_groups_path = path;
        }

        let content = &mut self.api.content;
        let overrides: [(&str, &mut String); 9] = [
            ("TEMPLATES_PATH", &mut content.templates_path),
            ("CREATE_TEMPLATE_PATH", &mut content.create_template_path),
            ("UPDATE_TEMPLATE_PATH", &mut content.update_template_path),
            ("DELETE_TEMPLATE_PATH", &mut content.delete_template_path),
            ("MEDIA_LIST_PATH", &mut content.media_list_path),
            ("MEDIA_UPLOAD_PATH", &mut content.media_upload_path),
            ("MEDIA_USAGE_PATH", &mut content.media_usage_path),
            ("MEDIA_DELETE_PATH", &mut content.media_delete_path),
            ("MEDIA_APP_TYPE", &mut content.app_type),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        }
    }
}

impl ApiConfig {
    pub fn require_base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                AdminError::Config(
                    "api.base_url is not set (config.toml or API_BASE_URL)".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn parses_partial_config_with_defaults() {
        let config = Config::from_toml_str(
            r#"
            [api]
            base_url = "https://groups.example.org/api/"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://groups.example.org/api/")
        );
        assert_eq!(config.api.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.api.unmatched_groups_path, DEFAULT_UNMATCHED_GROUPS_PATH);
        assert_eq!(config.ui.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::from_toml_str(
            r#"
            [api]
            base_url = "https://old.example.org/"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("API_BASE_URL", "https://new.example.org/"),
            ("UNMATCHED_GROUPS_PATH", "v2/unmatched"),
        ]
        .into_iter()
        .collect();

        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url.as_deref(), Some("https://new.example.org/"));
        assert_eq!(config.api.unmatched_groups_path, "v2/unmatched");
    }

    #[test]
    fn content_paths_come_from_file_then_environment() {
        let mut config = Config::from_toml_str(
            r#"
            [api.content]
            media_list_path = "media/{type}/students/whatsapp"
            app_type = "whatsapp"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.content.media_list_path, "media/{type}/students/whatsapp");
        assert_eq!(config.api.content.templates_path, DEFAULT_TEMPLATES_PATH);
        assert_eq!(config.api.content.app_type, "whatsapp");

        let env: HashMap<&str, &str> = [
            ("TEMPLATES_PATH", "v2/templates"),
            ("MEDIA_UPLOAD_PATH", "v2/media/{type}"),
            ("MEDIA_APP_TYPE", " "),
        ]
        .into_iter()
        .collect();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.content.templates_path, "v2/templates");
        assert_eq!(config.api.content.media_upload_path, "v2/media/{type}");
        assert_eq!(config.api.content.app_type, "whatsapp");
        assert_eq!(config.api.content.media_delete_path, DEFAULT_MEDIA_DELETE_PATH);
    }

    #[test]
    fn missing_base_url_is_a_config_error() {
        let config = Config::default();
        assert!(matches!(
            config.api.require_base_url(),
            Err(AdminError::Config(_))
        ));
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ui]\npage_size = 25").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.ui.page_size, 25);
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(AdminError::Config(_))));
    }
}
