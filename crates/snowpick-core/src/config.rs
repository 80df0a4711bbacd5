//! Connection configuration (snowpick.toml)
//!
//! A profile carries the account locator, user, one credential source, and
//! the optional session context (role/warehouse/database/schema). Profiles
//! load from a TOML file and any field can be overridden from `SNOWFLAKE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration loading/validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("exactly one of password or private_key_path must be set")]
    AmbiguousCredentials,
}

/// Resolved credential material
#[derive(Clone)]
pub enum Credentials {
    Password(String),
    /// PEM-encoded private key for key-pair auth
    PrivateKeyPem(String),
}

/// A connection profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Account locator, e.g. "xy12345.us-east-1"
    pub account: String,

    pub user: String,

    /// Password auth; mutually exclusive with `private_key_path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Key-pair auth: path to a PEM private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl SessionConfig {
    /// Load a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build a profile purely from `SNOWFLAKE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override any field that has a `SNOWFLAKE_*` environment variable set
    pub fn apply_env(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(v) = var("SNOWFLAKE_ACCOUNT") {
            self.account = v;
        }
        if let Some(v) = var("SNOWFLAKE_USER") {
            self.user = v;
        }
        if let Some(v) = var("SNOWFLAKE_PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = var("SNOWFLAKE_PRIVATE_KEY_PATH") {
            self.private_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("SNOWFLAKE_ROLE") {
            self.role = Some(v);
        }
        if let Some(v) = var("SNOWFLAKE_WAREHOUSE") {
            self.warehouse = Some(v);
        }
        if let Some(v) = var("SNOWFLAKE_DATABASE") {
            self.database = Some(v);
        }
        if let Some(v) = var("SNOWFLAKE_SCHEMA") {
            self.schema = Some(v);
        }
    }

    /// Check required fields and that exactly one credential source is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account.is_empty() {
            return Err(ConfigError::MissingField("account"));
        }
        if self.user.is_empty() {
            return Err(ConfigError::MissingField("user"));
        }
        match (&self.password, &self.private_key_path) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(ConfigError::AmbiguousCredentials),
        }
    }

    /// Resolve credential material, reading the key file for key-pair auth
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.validate()?;
        match (&self.password, &self.private_key_path) {
            (Some(password), None) => Ok(Credentials::Password(password.clone())),
            (None, Some(path)) => Ok(Credentials::PrivateKeyPem(std::fs::read_to_string(path)?)),
            _ => Err(ConfigError::AmbiguousCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_minimal_profile() {
        let config: SessionConfig = toml::from_str(
            r#"
            account = "xy12345.us-east-1"
            user = "ADMIN"
            password = "hunter2"
            warehouse = "COMPUTE_WH"
            "#,
        )
        .unwrap();

        assert_eq!(config.account, "xy12345.us-east-1");
        assert_eq!(config.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_account_rejected() {
        let config = SessionConfig {
            user: "ADMIN".to_string(),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField("account"))
        ));
    }

    #[test]
    fn both_credentials_rejected() {
        let config = SessionConfig {
            account: "acct".to_string(),
            user: "ADMIN".to_string(),
            password: Some("pw".to_string()),
            private_key_path: Some(PathBuf::from("/tmp/key.pem")),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AmbiguousCredentials)
        ));
    }

    #[test]
    fn from_env_builds_a_full_profile() {
        std::env::set_var("SNOWFLAKE_ACCOUNT", "xy12345.us-east-1");
        std::env::set_var("SNOWFLAKE_USER", "ADMIN");
        std::env::set_var("SNOWFLAKE_PASSWORD", "hunter2");
        std::env::set_var("SNOWFLAKE_WAREHOUSE", "COMPUTE_WH");

        let config = SessionConfig::from_env().unwrap();
        assert_eq!(config.account, "xy12345.us-east-1");
        assert_eq!(config.user, "ADMIN");
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.warehouse.as_deref(), Some("COMPUTE_WH"));

        std::env::remove_var("SNOWFLAKE_ACCOUNT");
        std::env::remove_var("SNOWFLAKE_USER");
        std::env::remove_var("SNOWFLAKE_PASSWORD");
        std::env::remove_var("SNOWFLAKE_WAREHOUSE");
    }

    #[test]
    fn no_credentials_rejected() {
        let config = SessionConfig {
            account: "acct".to_string(),
            user: "ADMIN".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AmbiguousCredentials)
        ));
    }
}
