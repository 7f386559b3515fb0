//! Transport layer.
//!
//! A [`Transport`] moves one encoded request to the gateway and returns the raw
//! status and body. It attaches credentials and refuses unsafe URLs, but it does
//! not interpret statuses or bodies; that is the job of
//! [`Gateway`](crate::Gateway).
//!
//! The trait is sealed. [`HttpTransport`] is the production implementation.
//!
//! ```rust,no_run
//! use braintree_gateway::{
//!     config::Credentials,
//!     transport::{HttpTransport, Transport, TransportRequest, Verb},
//! };
//!
//! # async fn example() -> braintree_gateway::error::Result<()> {
//! let transport = HttpTransport::new()?;
//! let credentials = Credentials::new("merchant_id", "public_key", "private_key");
//!
//! let request = TransportRequest::new(
//!     Verb::Get,
//!     "https://api.sandbox.braintreegateway.com:443",
//!     "/merchants/merchant_id/subscriptions/abc123",
//! );
//! let response = transport.send(&credentials, request).await?;
//! println!("gateway answered {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::{fmt, time::Duration};

use crate::{config::Credentials, error::Result};

pub mod config;
pub mod http;
#[cfg(test)]
pub(crate) mod mock;
mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// HTTP verbs the gateway API is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Read a resource.
    Get,
    /// Create a resource.
    Post,
    /// Update a resource or trigger an action on it (e.g. cancel).
    Put,
}

impl Verb {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request, borrowed from the caller for the duration of the call.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    /// Method.
    pub verb: Verb,
    /// Gateway origin, e.g. `https://api.braintreegateway.com:443`.
    pub base_url: &'a str,
    /// Absolute path below the origin.
    pub path: &'a str,
    /// Extra headers.
    pub headers: Vec<(&'a str, &'a str)>,
    /// Encoded document and its media type, if the request has a body.
    pub body: Option<(&'a str, &'a [u8])>,
    /// Deadline for the whole exchange. `None` keeps the client default.
    pub timeout: Option<Duration>,
    /// Accept a plain `http` origin (development gateways).
    pub allow_insecure_http: bool,
}

impl<'a> TransportRequest<'a> {
    /// Bodiless request with no extra headers and the default deadline.
    #[must_use]
    pub const fn new(verb: Verb, base_url: &'a str, path: &'a str) -> Self {
        Self {
            verb,
            base_url,
            path,
            headers: Vec::new(),
            body: None,
            timeout: None,
            allow_insecure_http: false,
        }
    }
}

/// What came back from the gateway, whatever the status.
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: u16,
    /// Body bytes, decompressed.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Carries requests to the gateway.
///
/// Implementations authenticate every request with the merchant
/// [`Credentials`], refuse unsafe origins, paths and headers before anything is
/// sent, and treat [`TransportRequest::timeout`] as a deadline for the whole
/// exchange. Only a failure to obtain a response is an error; every HTTP status
/// is returned as a [`TransportResponse`].
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Sends `request` and waits for the complete response.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestRefused`](crate::GatewayError::RequestRefused)
    /// if the request is refused locally, or an HTTP error if no response arrives.
    fn send<'a>(
        &'a self,
        credentials: &'a Credentials,
        request: TransportRequest<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Short protocol label for spans.
    fn protocol_name(&self) -> &'static str;
}
