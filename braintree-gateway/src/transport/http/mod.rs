//! reqwest-backed transport.
//!
//! Requests carry HTTP Basic credentials built from the merchant's key pair.
//! Responses may be gzip-compressed; bodies are returned decompressed.

use reqwest::{Client, Method};
use tracing::{debug, instrument};
use url::{Host, Url};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    config::Credentials,
    error::{GatewayError, Result},
    transport::{Transport, TransportRequest, TransportResponse, Verb, sealed},
};

const USER_AGENT: &str = concat!("braintree-gateway-rust/", env!("CARGO_PKG_VERSION"));

fn refused(reason: impl Into<String>) -> GatewayError {
    GatewayError::RequestRefused(reason.into())
}

/// Joins the origin and path after checking both.
///
/// The origin must be HTTPS on a non-loopback host unless the request allows
/// plain HTTP. The path must be absolute, with no empty, `.` or `..` segments.
fn resolve_url(request: &TransportRequest<'_>) -> Result<Url> {
    let mut url = Url::parse(request.base_url)
        .map_err(|e| refused(format!("invalid base URL {:?}: {e}", request.base_url)))?;

    match url.scheme() {
        "https" => {}
        "http" if request.allow_insecure_http => {}
        scheme => return Err(refused(format!("{scheme} base URLs are not allowed"))),
    }

    if url.host().is_none() {
        return Err(refused(format!("base URL {:?} has no host", request.base_url)));
    }
    if is_loopback(&url) && !request.allow_insecure_http {
        return Err(refused("loopback base URLs are only allowed for development"));
    }

    let Some(relative) = request.path.strip_prefix('/') else {
        return Err(refused(format!("path {:?} is not absolute", request.path)));
    };
    if relative.split('/').any(|segment| matches!(segment, "" | "." | "..")) {
        return Err(refused(format!("path {:?} has empty or relative segments", request.path)));
    }

    let joined = format!("{}/{relative}", url.path().trim_end_matches('/'));
    url.set_path(&joined);
    Ok(url)
}

/// Whether the URL's host is `localhost` or a loopback address.
pub(crate) fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn check_header(name: &str, value: &str) -> Result<()> {
    if name.chars().chain(value.chars()).any(char::is_control) {
        return Err(refused(format!("header {name:?} contains control characters")));
    }
    Ok(())
}

/// Transport over reqwest with a shared connection pool.
///
/// Clones share the pool.
///
/// ```
/// use braintree_gateway::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { http_version: HttpVersion::Http1, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Transport with [`HttpConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if the client cannot be built (e.g. no TLS backend).
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Transport with explicit pool, timeout and protocol settings.
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if the client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let builder = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        let builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        Ok(Self { client: builder.build()?, http_version: config.http_version })
    }

    #[instrument(skip_all, fields(method = %request.verb, path = request.path))]
    async fn exchange(
        &self,
        credentials: &Credentials,
        request: TransportRequest<'_>,
    ) -> Result<TransportResponse> {
        let url = resolve_url(&request)?;
        for (name, value) in &request.headers {
            check_header(name, value)?;
        }

        let method = match request.verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
        };

        let mut builder = self
            .client
            .request(method, url)
            .basic_auth(&credentials.public_key, Some(&credentials.private_key));
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some((content_type, body)) = request.body {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type).body(body.to_vec());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "gateway responded");

        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    async fn send<'a>(
        &'a self,
        credentials: &'a Credentials,
        request: TransportRequest<'a>,
    ) -> Result<TransportResponse> {
        self.exchange(credentials, request).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
