use validator::Validate;

/// Default Rule Store base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading [`StoreConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Invalid store configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Rule Store connection settings.
#[derive(Debug, Clone, Validate)]
pub struct StoreConfig {
    /// Base URL, e.g. `https://api.example.com`. No trailing slash needed.
    #[validate(url)]
    pub base_url: String,
    /// Bearer token sent with every request, when set.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `RULE_STORE_URL`          | `http://localhost:3000` |
    /// | `RULE_STORE_TOKEN`        | unset                   |
    /// | `RULE_STORE_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("RULE_STORE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token = lookup("RULE_STORE_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let timeout_secs = match lookup("RULE_STORE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "RULE_STORE_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url,
            token,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}
