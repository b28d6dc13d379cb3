//! Configuration management for sweep.
//!
//! Parses `sweep.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! The tenant host and credential support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `helpdesk.base_url`
//! - `helpdesk.api_key`

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override retention window in days.
    pub retention_days: Option<u32>,
    /// Override dry-run flag.
    pub dry_run: Option<bool>,
    /// Override the per-run deletion cap.
    pub max_deletions: Option<u32>,
    /// Override tenant base URL.
    pub base_url: Option<String>,
    /// Override API credential.
    pub api_key: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sweep.toml";

/// Upper bound for `retention.days` (100 years).
const MAX_RETENTION_DAYS: u32 = 36_500;

/// Upper bound for `api.page_size`.
const MAX_PAGE_SIZE: u32 = 1000;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Helpdesk tenant and credential.
    pub helpdesk: HelpdeskConfig,
    /// Retention policy.
    pub retention: RetentionConfig,
    /// Listing endpoints and query parameter names.
    pub api: ApiConfig,
    /// Delete route candidates.
    pub delete: DeleteConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// How the credential is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Basic base64(api_key:X)`.
    #[default]
    Basic,
    /// `Bearer api_key`.
    Bearer,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic"),
            Self::Bearer => f.write_str("bearer"),
        }
    }
}

/// Helpdesk tenant configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HelpdeskConfig {
    /// Tenant base URL (e.g. `https://acme.helpdesk.example`).
    pub base_url: String,
    /// API credential.
    pub api_key: String,
    /// Authorization scheme.
    pub auth: AuthScheme,
    /// Per-request timeout. `None` leaves the HTTP client default in place.
    pub timeout_secs: Option<u64>,
}

impl HelpdeskConfig {
    /// Validate that the tenant and credential are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "helpdesk.base_url")?;
        require_http_url(&self.base_url, "helpdesk.base_url")?;
        require_non_empty(&self.api_key, "helpdesk.api_key")?;
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "helpdesk.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Retention policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Days after closure before a ticket's attachments are eligible.
    pub days: u32,
    /// Log intended deletions without issuing them.
    pub dry_run: bool,
    /// Hard ceiling on attachments processed per run.
    pub max_deletions: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: 90,
            dry_run: true,
            max_deletions: 500,
        }
    }
}

/// Listing endpoints and query parameter names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Ticket listing path.
    pub tickets_path: String,
    /// Attachment listing path template, must contain `{ticket_id}`.
    pub attachments_path: String,
    /// Records requested per page.
    pub page_size: u32,
    /// Page number query parameter.
    pub page_param: String,
    /// Page size query parameter.
    pub page_size_param: String,
    /// Ticket status query parameter.
    pub status_param: String,
    /// Status value selecting closed tickets.
    pub closed_status: String,
    /// Query parameter carrying the closure cutoff timestamp.
    pub cutoff_param: String,
    /// Attachment listing sort parameter.
    pub sort_param: String,
    /// Attachment listing sort order.
    pub sort_order: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            tickets_path: "/api/v2/tickets".to_owned(),
            attachments_path: "/api/v2/tickets/{ticket_id}/attachments".to_owned(),
            page_size: 100,
            page_param: "page".to_owned(),
            page_size_param: "per_page".to_owned(),
            status_param: "status".to_owned(),
            closed_status: "Closed".to_owned(),
            cutoff_param: "closed_before".to_owned(),
            sort_param: "order".to_owned(),
            sort_order: "asc".to_owned(),
        }
    }
}

/// Delete route candidates, tried in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    /// Route templates using `{attachment_id}`, `{ticket_id}`, `{activity_id}`.
    pub routes: Vec<String>,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            routes: vec![
                "/api/v2/attachments/{attachment_id}".to_owned(),
                "/api/v2/tickets/{ticket_id}/attachments/{attachment_id}".to_owned(),
                "/api/v2/tickets/{ticket_id}/activities/{activity_id}/attachments/{attachment_id}"
                    .to_owned(),
            ],
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`helpdesk.api_key`").
        field: String,
        /// Error message (e.g., "${`HELPDESK_API_KEY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sweep.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, then the result is validated.
    /// The `[helpdesk]` section is checked separately by [`Config::require_helpdesk`]
    /// because commands like `sweep config` run without credentials.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(days) = settings.retention_days {
            self.retention.days = days;
        }
        if let Some(dry_run) = settings.dry_run {
            self.retention.dry_run = dry_run;
        }
        if let Some(max) = settings.max_deletions {
            self.retention.max_deletions = max;
        }
        if let Some(base_url) = &settings.base_url {
            self.helpdesk.base_url.clone_from(base_url);
        }
        if let Some(api_key) = &settings.api_key {
            self.helpdesk.api_key.clone_from(api_key);
        }
    }

    /// Get validated helpdesk configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the tenant or credential is missing or invalid.
    pub fn require_helpdesk(&self) -> Result<&HelpdeskConfig, ConfigError> {
        self.helpdesk.validate()?;
        Ok(&self.helpdesk)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate everything except the `[helpdesk]` section.
    ///
    /// Delete route templates are parsed, and rejected, by the helpdesk client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_retention()?;
        self.validate_api()?;
        Ok(())
    }

    fn validate_retention(&self) -> Result<(), ConfigError> {
        if self.retention.days == 0 || self.retention.days > MAX_RETENTION_DAYS {
            return Err(ConfigError::Validation(format!(
                "retention.days must be between 1 and {MAX_RETENTION_DAYS}"
            )));
        }
        if self.retention.max_deletions == 0 {
            return Err(ConfigError::Validation(
                "retention.max_deletions must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_api(&self) -> Result<(), ConfigError> {
        let api = &self.api;
        if api.page_size == 0 || api.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Validation(format!(
                "api.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        require_non_empty(&api.tickets_path, "api.tickets_path")?;
        require_non_empty(&api.page_param, "api.page_param")?;
        require_non_empty(&api.page_size_param, "api.page_size_param")?;
        require_non_empty(&api.status_param, "api.status_param")?;
        require_non_empty(&api.closed_status, "api.closed_status")?;
        require_non_empty(&api.cutoff_param, "api.cutoff_param")?;
        require_non_empty(&api.sort_param, "api.sort_param")?;

        if api.attachments_path.matches("{ticket_id}").count() != 1 {
            return Err(ConfigError::Validation(
                "api.attachments_path must contain exactly one {ticket_id} placeholder".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.helpdesk.base_url = expand::expand_env(&self.helpdesk.base_url, "helpdesk.base_url")?;
        self.helpdesk.api_key = expand::expand_env(&self.helpdesk.api_key, "helpdesk.api_key")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(result: Result<(), ConfigError>, expected_substrings: &[&str]) {
        let err = result.expect_err("Expected validation to fail");
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    fn valid_helpdesk() -> HelpdeskConfig {
        HelpdeskConfig {
            base_url: "https://acme.helpdesk.test".to_owned(),
            api_key: "key".to_owned(),
            auth: AuthScheme::Basic,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retention.days, 90);
        assert!(config.retention.dry_run);
        assert_eq!(config.retention.max_deletions, 500);
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.closed_status, "Closed");
        assert_eq!(config.delete.routes.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.retention.days, 90);
        assert_eq!(config.helpdesk.auth, AuthScheme::Basic);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[helpdesk]
base_url = "https://acme.helpdesk.test"
api_key = "secret"
auth = "bearer"
timeout_secs = 15

[retention]
days = 30
dry_run = false
max_deletions = 10

[api]
page_size = 50
cutoff_param = "updated_before"

[delete]
routes = ["/files/{attachment_id}"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.helpdesk.auth, AuthScheme::Bearer);
        assert_eq!(config.helpdesk.timeout_secs, Some(15));
        assert_eq!(config.retention.days, 30);
        assert!(!config.retention.dry_run);
        assert_eq!(config.retention.max_deletions, 10);
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.cutoff_param, "updated_before");
        assert_eq!(config.api.page_param, "page");
        assert_eq!(config.delete.routes, vec!["/files/{attachment_id}".to_owned()]);
    }

    #[test]
    fn test_parse_unknown_auth_scheme_fails() {
        let toml = r#"
[helpdesk]
auth = "digest"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            retention_days: Some(7),
            dry_run: Some(false),
            base_url: Some("https://other.helpdesk.test".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.retention.days, 7);
        assert!(!config.retention.dry_run);
        assert_eq!(config.retention.max_deletions, 500); // Unchanged
        assert_eq!(config.helpdesk.base_url, "https://other.helpdesk.test");
        assert_eq!(config.helpdesk.api_key, ""); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.retention.days, 90);
        assert!(config.retention.dry_run);
    }

    #[test]
    fn test_expand_env_vars_helpdesk() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SWEEP_CFG_TEST_KEY", "from-env");
        }
        let toml = r#"
[helpdesk]
base_url = "https://acme.helpdesk.test"
api_key = "${SWEEP_CFG_TEST_KEY}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.helpdesk.api_key, "from-env");
        unsafe {
            std::env::remove_var("SWEEP_CFG_TEST_KEY");
        }
    }

    #[test]
    fn test_validate_retention_days_zero() {
        let mut config = Config::default();
        config.retention.days = 0;
        assert_validation_error(config.validate(), &["retention.days"]);
    }

    #[test]
    fn test_validate_retention_days_upper_bound() {
        let mut config = Config::default();
        config.retention.days = MAX_RETENTION_DAYS;
        assert!(config.validate().is_ok());
        config.retention.days = u32::MAX;
        assert_validation_error(config.validate(), &["retention.days", "36500"]);
    }

    #[test]
    fn test_validate_max_deletions_zero() {
        let mut config = Config::default();
        config.retention.max_deletions = 0;
        assert_validation_error(config.validate(), &["retention.max_deletions"]);
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let mut config = Config::default();
        config.api.page_size = 0;
        assert_validation_error(config.validate(), &["api.page_size"]);
        config.api.page_size = MAX_PAGE_SIZE + 1;
        assert_validation_error(config.validate(), &["api.page_size"]);
    }

    #[test]
    fn test_validate_attachments_path_needs_ticket_id() {
        let mut config = Config::default();
        config.api.attachments_path = "/api/v2/attachments".to_owned();
        assert_validation_error(config.validate(), &["api.attachments_path", "{ticket_id}"]);
    }

    #[test]
    fn test_helpdesk_validate_valid() {
        assert!(valid_helpdesk().validate().is_ok());
    }

    #[test]
    fn test_helpdesk_validate_empty_key() {
        let mut helpdesk = valid_helpdesk();
        helpdesk.api_key = String::new();
        assert_validation_error(helpdesk.validate(), &["helpdesk.api_key"]);
    }

    #[test]
    fn test_helpdesk_validate_invalid_url() {
        let mut helpdesk = valid_helpdesk();
        helpdesk.base_url = "acme.helpdesk.test".to_owned();
        assert_validation_error(helpdesk.validate(), &["helpdesk.base_url", "http"]);
    }

    #[test]
    fn test_helpdesk_validate_zero_timeout() {
        let mut helpdesk = valid_helpdesk();
        helpdesk.timeout_secs = Some(0);
        assert_validation_error(helpdesk.validate(), &["timeout_secs"]);
    }

    #[test]
    fn test_require_helpdesk_missing_section() {
        let config = Config::default();
        assert!(config.require_helpdesk().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[helpdesk]
base_url = "https://acme.helpdesk.test"
api_key = "key"

[retention]
max_deletions = 3
"#,
        )
        .unwrap();

        let overrides = CliSettings {
            dry_run: Some(false),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&overrides)).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.retention.max_deletions, 3);
        assert!(!config.retention.dry_run);
        assert!(config.require_helpdesk().is_ok());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.toml");
        std::fs::write(&path, "").unwrap();

        let overrides = CliSettings {
            max_deletions: Some(0),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
