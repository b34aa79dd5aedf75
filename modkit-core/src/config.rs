//! Seed configuration
//!
//! Literal values an installation may want to change (titles, the webhook
//! target, the automation account, the seed project) live here. Everything
//! else about the initial configuration is fixed seed data.

use crate::{ConfigError, DEFAULT_LOCALE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-call bootstrap switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapOptions {
    /// Generate workflow transitions. When false trackers and statuses exist
    /// with no legal transitions.
    pub workflow: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self { workflow: true }
    }
}

impl BootstrapOptions {
    pub fn without_workflow() -> Self {
        Self { workflow: false }
    }
}

/// Automation account created during bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AutomationAccount {
    pub login: String,
    pub firstname: String,
    pub lastname: String,
    pub mail: String,
    pub language: String,
}

impl Default for AutomationAccount {
    fn default() -> Self {
        Self {
            login: "modbot".to_string(),
            firstname: "Modbot".to_string(),
            lastname: "Automation".to_string(),
            mail: "modbot@example.com".to_string(),
            language: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Seed project created during bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProjectConfig {
    pub name: String,
    pub identifier: String,
    pub is_public: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Tickets".to_string(),
            identifier: "tickets".to_string(),
            is_public: false,
        }
    }
}

/// Master seed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SeedConfig {
    /// Locale used when the caller does not pick one.
    pub locale: String,
    pub app_title: String,
    /// Target registered as the seed project's webhook.
    pub webhook_url: String,
    /// Pre-existing operator account added to the admin group.
    pub operator_user_id: i64,
    pub automation: AutomationAccount,
    pub project: ProjectConfig,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            app_title: "Modkit".to_string(),
            webhook_url: "http://redmine-handler:8080/webhook".to_string(),
            operator_user_id: 1,
            automation: AutomationAccount::default(),
            project: ProjectConfig::default(),
        }
    }
}

impl SeedConfig {
    /// Load from an optional TOML file, apply environment overrides and
    /// validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Missing keys keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: SeedConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup`.
    ///
    /// Environment variables:
    /// - `MODKIT_SEED_LOCALE`: default locale
    /// - `MODKIT_SEED_APP_TITLE`: application title setting
    /// - `MODKIT_SEED_WEBHOOK_URL`: webhook target of the seed project
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locale) = lookup("MODKIT_SEED_LOCALE") {
            self.locale = locale;
        }
        if let Some(title) = lookup("MODKIT_SEED_APP_TITLE") {
            self.app_title = title;
        }
        if let Some(url) = lookup("MODKIT_SEED_WEBHOOK_URL") {
            self.webhook_url = url;
        }
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - locale, app_title, project name/identifier and automation login are non-empty
    /// - webhook_url is an http(s) URL
    /// - operator_user_id > 0
    /// - automation mail contains `@`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("locale", &self.locale),
            ("app_title", &self.app_title),
            ("webhook_url", &self.webhook_url),
            ("automation.login", &self.automation.login),
            ("automation.mail", &self.automation.mail),
            ("project.name", &self.project.name),
            ("project.identifier", &self.project.identifier),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: field.to_string(),
                });
            }
        }

        let webhook = url::Url::parse(&self.webhook_url).map_err(|e| ConfigError::InvalidValue {
            field: "webhook_url".to_string(),
            value: self.webhook_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(webhook.scheme(), "http" | "https") || !webhook.has_host() {
            return Err(ConfigError::InvalidValue {
                field: "webhook_url".to_string(),
                value: self.webhook_url.clone(),
                reason: "must be an absolute http(s) URL".to_string(),
            });
        }

        if self.operator_user_id <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "operator_user_id".to_string(),
                value: self.operator_user_id.to_string(),
                reason: "operator_user_id must be greater than 0".to_string(),
            });
        }

        if !self.automation.mail.contains('@') {
            return Err(ConfigError::InvalidValue {
                field: "automation.mail".to_string(),
                value: self.automation.mail.clone(),
                reason: "must be an email address".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = SeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.project.identifier, "tickets");
        assert_eq!(config.automation.login, "modbot");
    }

    #[test]
    fn test_default_options_enable_workflow() {
        assert!(BootstrapOptions::default().workflow);
        assert!(!BootstrapOptions::without_workflow().workflow);
    }

    #[test]
    fn test_validate_rejects_bad_webhook() {
        let config = SeedConfig {
            webhook_url: "ftp://example.com/hook".to_string(),
            ..SeedConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "webhook_url")
        );
    }

    #[test]
    fn test_validate_rejects_webhook_without_host() {
        for url in ["http://", "https://", "not a url"] {
            let config = SeedConfig {
                webhook_url: url.to_string(),
                ..SeedConfig::default()
            };
            let err = config.validate().unwrap_err();
            match err {
                ConfigError::InvalidValue { field, .. } => assert_eq!(field, "webhook_url"),
                other => panic!("{} gave {:?}", url, other),
            }
        }
    }

    #[test]
    fn test_validate_rejects_blank_identifier() {
        let mut config = SeedConfig::default();
        config.project.identifier = "  ".to_string();
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::MissingRequired { field } => assert_eq!(field, "project.identifier"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_operator_zero() {
        let config = SeedConfig {
            operator_user_id: 0,
            ..SeedConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("MODKIT_SEED_LOCALE", "de"),
            ("MODKIT_SEED_WEBHOOK_URL", "https://hooks.example.com/in"),
        ]);
        let mut config = SeedConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.locale, "de");
        assert_eq!(config.webhook_url, "https://hooks.example.com/in");
        assert_eq!(config.app_title, "Modkit");
    }

    #[test]
    fn test_from_path_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "app_title = \"Moderation\"\n\n[project]\nname = \"Reports\"\nidentifier = \"reports\""
        )
        .unwrap();

        let config = SeedConfig::from_path(file.path()).unwrap();
        assert_eq!(config.app_title, "Moderation");
        assert_eq!(config.project.identifier, "reports");
        assert!(!config.project.is_public);
        assert_eq!(config.automation.login, "modbot");
    }

    #[test]
    fn test_from_path_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unknown_key = 1").unwrap();
        let err = SeedConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
