//! Error types for the Braintree gateway client.
//!
//! Every operation returns [`Result<T>`], which fails with exactly one
//! [`GatewayError`]. Errors fall into three groups that callers usually need to
//! tell apart, because retrying only makes sense for one of them:
//!
//! - **Request errors** ([`GatewayError::Validation`], [`GatewayError::InvalidInput`],
//!   [`GatewayError::RequestRefused`]): the request itself was wrong. Fix it, do
//!   not retry.
//! - **Resource errors** ([`GatewayError::NotFound`]): nothing exists at that id.
//! - **Infrastructure errors** ([`GatewayError::HttpError`],
//!   [`GatewayError::TransportError`], [`GatewayError::ServerError`], ...): the
//!   call may succeed later. See [`GatewayError::is_retryable`].
//!
//! The client never retries on its own.
//!
//! # Examples
//!
//! ```
//! use braintree_gateway::error::{GatewayError, ValidationErrors};
//!
//! let mut errors = ValidationErrors::new("Plan ID is invalid.");
//! errors.push("subscription.plan_id", "91904", "plan_id", "Plan ID is invalid.");
//!
//! let err = GatewayError::Validation(errors);
//! assert!(!err.is_retryable());
//! assert!(err.validation_errors().is_some_and(|e| e.has_code("91904")));
//! ```

use std::{collections::BTreeMap, fmt};

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the gateway.
///
/// # Error Recovery
///
/// - **Validation** ([`Validation`](Self::Validation)): inspect the per-field codes,
///   correct the request, send again
/// - **Missing resource** ([`NotFound`](Self::NotFound)): the id is wrong or the
///   resource was removed
/// - **Credentials** ([`Authentication`](Self::Authentication),
///   [`Authorization`](Self::Authorization)): check the configured keys
/// - **Infrastructure** ([`HttpError`](Self::HttpError),
///   [`TransportError`](Self::TransportError), [`ServerError`](Self::ServerError),
///   [`TooManyRequests`](Self::TooManyRequests),
///   [`DownForMaintenance`](Self::DownForMaintenance)): retry with backoff
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway rejected one or more field values (HTTP 422).
    ///
    /// Carries every code the gateway returned, addressable by field path.
    #[error("gateway rejected the request: {0}")]
    Validation(ValidationErrors),

    /// No resource exists at the requested id (HTTP 404).
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The gateway did not accept the configured credentials (HTTP 401).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The credentials are valid but lack permission for the call (HTTP 403).
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// The gateway requires a newer API version (HTTP 426).
    #[error("gateway requires a newer client API version")]
    UpgradeRequired,

    /// The gateway is rate limiting this merchant (HTTP 429).
    #[error("too many requests")]
    TooManyRequests,

    /// The gateway failed internally (HTTP 500).
    #[error("gateway server error (status {0})")]
    ServerError(u16),

    /// The gateway is down for maintenance (HTTP 503).
    #[error("gateway is down for maintenance")]
    DownForMaintenance,

    /// The gateway answered with a status this client does not handle.
    #[error("unexpected gateway status {0}")]
    UnexpectedStatus(u16),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, refused connections, DNS and TLS failures.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The transport failed without producing a response.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The request was refused locally and never sent.
    ///
    /// Raised for unsafe origins, paths or headers. Sending the same request again
    /// fails the same way.
    #[error("request refused: {0}")]
    RequestRefused(String),

    /// A response body could not be decoded into the expected type.
    #[error("failed to decode gateway response: {0}")]
    Decode(String),

    /// A request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// Caller input cannot be sent as given (for example an empty resource id).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// Returns true when the failure came from infrastructure and the same call
    /// may succeed if sent again later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_)
            | Self::TransportError(_)
            | Self::TooManyRequests
            | Self::ServerError(_)
            | Self::DownForMaintenance => true,
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::Authentication(_)
            | Self::Authorization(_)
            | Self::UpgradeRequired
            | Self::UnexpectedStatus(_)
            | Self::Decode(_)
            | Self::Encode(_)
            | Self::InvalidInput(_)
            | Self::RequestRefused(_)
            | Self::Config(_) => false,
        }
    }

    /// Returns the validation details when this is a [`Validation`](Self::Validation) error.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns true for [`NotFound`](Self::NotFound).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A single field-level error reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Gateway error code, e.g. `"91904"`.
    pub code: String,
    /// Attribute the code refers to, as the gateway names it (e.g. `plan_id`).
    pub attribute: String,
    /// Human-readable message.
    pub message: String,
}

/// Validation errors from an `api-error-response` document.
///
/// Errors are keyed by field path: the chain of nested resource elements followed
/// by the attribute, joined with `.` (e.g. `subscription.descriptor.name`). Errors
/// reported on a resource as a whole are keyed by the resource path alone. Codes are
/// kept exactly as the gateway sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    message: String,
    fields: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    /// Creates an empty set carrying the gateway's summary message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), fields: BTreeMap::new() }
    }

    /// Records one field error under `path`.
    pub fn push(
        &mut self,
        path: impl Into<String>,
        code: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.fields.entry(path.into()).or_default().push(FieldError {
            code: code.into(),
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    /// Summary message from the gateway.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Errors reported for one field path.
    #[must_use]
    pub fn for_field(&self, path: &str) -> &[FieldError] {
        self.fields.get(path).map_or(&[], Vec::as_slice)
    }

    /// Iterates over `(path, errors)` pairs in path order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.fields.iter().map(|(path, errors)| (path.as_str(), errors.as_slice()))
    }

    /// All codes, in path order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.fields.values().flatten().map(|e| e.code.as_str())
    }

    /// Returns true if any field carries `code`.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.codes().any(|c| c == code)
    }

    /// Returns true if no field errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let codes: Vec<&str> = self.codes().collect();
        if !codes.is_empty() {
            write!(f, " (codes: {})", codes.join(", "))?;
        }
        Ok(())
    }
}
