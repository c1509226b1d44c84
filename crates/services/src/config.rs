use crate::error::ConfigError;

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "LMS_API_BASE_URL";

/// Backend connection settings. The base URL is the only external
/// configuration this client consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Reads the base URL from [`BASE_URL_ENV`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingBaseUrl` when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        std::env::var(BASE_URL_ENV)
            .map(Self::new)
            .map_err(|_| ConfigError::MissingBaseUrl)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path starting with `/`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
