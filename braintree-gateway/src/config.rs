//! Gateway configuration.
//!
//! A [`GatewayConfig`] names the environment, the merchant credentials and the
//! HTTP client settings. It is built once, validated, and then only read.
//!
//! ```toml
//! environment = "sandbox"
//!
//! [credentials]
//! merchant_id = "your_merchant_id"
//! public_key = "your_public_key"
//! private_key = "your_private_key"
//!
//! [http]
//! timeout_secs = 60
//! ```

use std::{fmt, str::FromStr};

use serde::Deserialize;
use url::Url;

use crate::{
    error::{GatewayError, Result},
    transport::{HttpConfig, http::is_loopback},
};

const ENV_ENVIRONMENT: &str = "BRAINTREE_ENVIRONMENT";
const ENV_MERCHANT_ID: &str = "BRAINTREE_MERCHANT_ID";
const ENV_PUBLIC_KEY: &str = "BRAINTREE_PUBLIC_KEY";
const ENV_PRIVATE_KEY: &str = "BRAINTREE_PRIVATE_KEY";
const ENV_BASE_URL: &str = "BRAINTREE_BASE_URL";

/// Gateway environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Local gateway for development, `http://localhost:3000`.
    Development,
    /// Internal QA gateway.
    Qa,
    /// Sandbox gateway. No real money moves.
    #[default]
    Sandbox,
    /// Production gateway.
    Production,
}

impl Environment {
    /// Base URL of the environment's gateway.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:3000",
            Self::Qa => "https://gateway.qa.braintreepayments.com:443",
            Self::Sandbox => "https://api.sandbox.braintreegateway.com:443",
            Self::Production => "https://api.braintreegateway.com:443",
        }
    }

    /// Returns true if plain HTTP is acceptable for this environment.
    #[must_use]
    pub const fn allows_insecure_http(self) -> bool {
        matches!(self, Self::Development)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Qa => "qa",
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "qa" => Ok(Self::Qa),
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(GatewayError::Config(format!("unknown environment: {other}"))),
        }
    }
}

/// Merchant API credentials.
///
/// The public and private key are sent as HTTP Basic credentials on every call.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Merchant id, part of every resource path.
    pub merchant_id: String,
    /// Public API key.
    pub public_key: String,
    /// Private API key. Never logged.
    pub private_key: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("merchant_id", &self.merchant_id),
            ("public_key", &self.public_key),
            ("private_key", &self.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Root gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Target environment.
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the environment's base URL (for proxies and local test servers).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Merchant credentials.
    pub credentials: Credentials,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl GatewayConfig {
    /// Creates a configuration with default HTTP settings.
    #[must_use]
    pub fn new(environment: Environment, credentials: Credentials) -> Self {
        Self { environment, base_url: None, credentials, http: HttpConfig::default() }
    }

    /// Replaces the environment's base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the document does not parse or fails
    /// [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use braintree_gateway::config::{Environment, GatewayConfig};
    ///
    /// let config = GatewayConfig::from_toml(
    ///     r#"
    ///     environment = "production"
    ///     [credentials]
    ///     merchant_id = "m"
    ///     public_key = "pub"
    ///     private_key = "priv"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.environment, Environment::Production);
    /// assert_eq!(config.base_url(), "https://api.braintreegateway.com:443");
    /// ```
    pub fn from_toml(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)
            .map_err(|e| GatewayError::Config(format!("invalid TOML configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from `BRAINTREE_*` environment variables.
    ///
    /// `BRAINTREE_ENVIRONMENT` defaults to `sandbox`; `BRAINTREE_BASE_URL` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if a required variable is missing or the
    /// result fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| GatewayError::Config(format!("{key} is not set")))
        };

        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };
        let credentials = Credentials::new(
            required(ENV_MERCHANT_ID)?,
            required(ENV_PUBLIC_KEY)?,
            required(ENV_PRIVATE_KEY)?,
        );

        let config = Self {
            environment,
            base_url: lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty()),
            credentials,
            http: HttpConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Base URL requests are sent to: the override if set, else the environment's.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_else(|| self.environment.base_url())
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - credentials are non-empty
    /// - the base URL parses and has a host
    /// - the base URL uses HTTPS, unless the environment is `development`
    /// - the base URL is not a loopback host, unless the environment is `development`
    /// - HTTP timeouts are in range
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] describing the first failed check.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;

        let base_url = self.base_url();
        let url = Url::parse(base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base_url '{base_url}': {e}")))?;

        match url.scheme() {
            "https" => {}
            "http" if self.environment.allows_insecure_http() => {}
            scheme => {
                return Err(GatewayError::Config(format!(
                    "base_url must use HTTPS in {}, got: {scheme}",
                    self.environment
                )));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(GatewayError::Config(format!("base_url has no host: {base_url}")));
        }
        if is_loopback(&url) && !self.environment.allows_insecure_http() {
            return Err(GatewayError::Config(format!(
                "loopback base_url is only allowed in development, got: {base_url}"
            )));
        }

        self.http.validate()
    }
}
