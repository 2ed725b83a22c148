use std::time::Duration;

use crate::client::HttpTransport;
use crate::error::TransportError;

/// Default user agent: `percept-sdk/<crate version>`.
pub const DEFAULT_USER_AGENT: &str = concat!("percept-sdk/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`HttpTransport`].
///
/// # Example
///
/// ```ignore
/// let transport = HttpTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .user_agent("my-app/1.0")
///     .build()?;
/// ```
#[must_use = "HttpTransportBuilder does nothing until .build() is called"]
pub struct HttpTransportBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: String,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransportBuilder {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Total per-request timeout, connect through body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout for establishing the TCP/TLS connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if the underlying client cannot be
    /// constructed (e.g. TLS backend initialization failure).
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(HttpTransport::from_client(inner))
    }
}
