//! Connection settings for a Fineract tenant.

use serde::Deserialize;

use crate::error::{ApiError, Result};

pub const DEFAULT_TENANT: &str = "default";
pub const DEFAULT_USERNAME: &str = "mifos";
pub const DEFAULT_PASSWORD: &str = "password";

/// Where and as whom to talk to Fineract.
///
/// `base_url` points at the API root, e.g.
/// `https://localhost:8443/fineract-provider/api/v1`. Resource paths are
/// appended to it verbatim.
#[derive(Clone, Deserialize)]
pub struct FineractConfig {
    pub base_url: String,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_verify_tls() -> bool {
    true
}

impl FineractConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant: default_tenant(),
            username: default_username(),
            password: default_password(),
            verify_tls: default_verify_tls(),
        }
    }

    /// Read settings from `FINERACT_*` environment variables.
    ///
    /// Only `FINERACT_BASE_URL` is required; the rest fall back to the stock
    /// Fineract development credentials.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("FINERACT_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::Config("FINERACT_BASE_URL is not set".to_string()))?;

        let mut config = Self::new(&base_url);
        if let Some(tenant) = lookup("FINERACT_TENANT") {
            config.tenant = tenant;
        }
        if let Some(username) = lookup("FINERACT_USERNAME") {
            config.username = username;
        }
        if let Some(password) = lookup("FINERACT_PASSWORD") {
            config.password = password;
        }
        if let Some(verify) = lookup("FINERACT_VERIFY_TLS") {
            config.verify_tls = !matches!(verify.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no");
        }
        Ok(config)
    }

    pub fn with_tenant(mut self, tenant: &str) -> Self {
        self.tenant = tenant.to_string();
        self
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }
}

impl std::fmt::Debug for FineractConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FineractConfig")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .field("username", &self.username)
            .field("password", &"***")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}
