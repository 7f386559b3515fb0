//! Gateway client.
//!
//! [`Gateway`] owns the configuration and a [`Transport`]. Resource gateways
//! (e.g. [`SubscriptionGateway`]) borrow it, build paths and bodies, and go
//! through one shared request routine, which maps HTTP statuses to
//! [`GatewayError`]s.
//!
//! Every call is a single round trip. Nothing is retried or cached, so one
//! `Gateway` may be shared across tasks (e.g. in an `Arc`) without locking.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::{
    codec,
    config::GatewayConfig,
    error::{GatewayError, Result},
    transport::{HttpTransport, Transport, TransportRequest, Verb},
};

mod subscription;

pub use subscription::SubscriptionGateway;

/// API version sent in the `X-ApiVersion` header.
pub const API_VERSION: &str = "4";

const XML: &str = "application/xml";

/// Client for one merchant account.
///
/// # Examples
///
/// ```rust,no_run
/// use braintree_gateway::{
///     Gateway, SubscriptionRequest,
///     config::{Credentials, Environment, GatewayConfig},
/// };
///
/// # async fn example() -> braintree_gateway::error::Result<()> {
/// let config = GatewayConfig::new(
///     Environment::Sandbox,
///     Credentials::new("merchant_id", "public_key", "private_key"),
/// );
/// let gateway = Gateway::new(config)?;
///
/// let subscription = gateway
///     .subscription()
///     .create(&SubscriptionRequest {
///         payment_method_token: Some("token".into()),
///         plan_id: Some("test_plan".into()),
///         ..SubscriptionRequest::default()
///     })
///     .await?;
/// println!("created {}", subscription.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Gateway<T: Transport = HttpTransport> {
    config: GatewayConfig,
    transport: T,
}

impl Gateway<HttpTransport> {
    /// Creates a gateway that talks HTTP using the configuration's HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the configuration is invalid, or an HTTP
    /// error if the client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(&config.http)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> Gateway<T> {
    /// Creates a gateway over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the configuration is invalid.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    /// The configuration this gateway was built with.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscription operations.
    #[must_use]
    pub const fn subscription(&self) -> SubscriptionGateway<'_, T> {
        SubscriptionGateway::new(self)
    }

    /// Path prefix for this merchant's resources, e.g. `/merchants/abc`.
    pub(crate) fn merchant_path(&self) -> Result<String> {
        let merchant_id = &self.config.credentials.merchant_id;
        validate_resource_id("merchant id", merchant_id)?;
        Ok(format!("/merchants/{merchant_id}"))
    }

    /// Sends one request and returns the body of a successful response.
    ///
    /// `timeout` is handed to the transport unchanged.
    ///
    /// # Errors
    ///
    /// Returns the [`GatewayError`] matching the response status, or the
    /// transport's error if no response arrived.
    #[instrument(
        skip_all,
        fields(method = %verb, path = %path, protocol = self.transport.protocol_name())
    )]
    pub(crate) async fn execute(
        &self,
        verb: Verb,
        path: &str,
        body: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>> {
        let request = TransportRequest {
            headers: vec![("Accept", XML), ("X-ApiVersion", API_VERSION)],
            body: body.map(|body| (XML, body)),
            timeout,
            allow_insecure_http: self.config.environment.allows_insecure_http(),
            ..TransportRequest::new(verb, self.config.base_url(), path)
        };
        let response = self.transport.send(&self.config.credentials, request).await?;

        debug!(status = response.status, "gateway response");

        if response.is_success() {
            return Ok(response.body);
        }

        Err(status_error(response.status, path, &response.body))
    }
}

/// Maps a non-success status to an error.
fn status_error(status: u16, path: &str, body: &[u8]) -> GatewayError {
    match status {
        401 => GatewayError::Authentication(format!("credentials rejected for {path}")),
        403 => GatewayError::Authorization(format!("not permitted to access {path}")),
        404 => GatewayError::NotFound(path.to_owned()),
        422 => match codec::parse_error_response(body) {
            Ok(errors) => {
                warn!(path, codes = %errors.codes().collect::<Vec<_>>().join(","), "validation failed");
                GatewayError::Validation(errors)
            }
            Err(e) => e,
        },
        426 => GatewayError::UpgradeRequired,
        429 => GatewayError::TooManyRequests,
        500 => GatewayError::ServerError(status),
        503 => GatewayError::DownForMaintenance,
        other => GatewayError::UnexpectedStatus(other),
    }
}

/// Checks that `id` can be placed in a URL path segment as-is.
///
/// Only ASCII alphanumerics, `-` and `_` are accepted.
pub(crate) fn validate_resource_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(GatewayError::InvalidInput(format!("{what} cannot be empty")));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(GatewayError::InvalidInput(format!(
            "{what} can only contain alphanumeric characters, hyphens, and underscores"
        )));
    }
    Ok(())
}
