use async_trait::async_trait;

use crate::builder::HttpTransportBuilder;
use crate::error::TransportError;
use crate::transport::{Method, Transport, TransportRequest};

/// Default [`Transport`] implementation backed by `reqwest`.
///
/// Cloning is cheap; the inner client shares its connection pool. The
/// transport owns timeout policy (see [`HttpTransportBuilder`]); it does
/// not retry, and it never interprets the response beyond parsing it as
/// JSON. Non-2xx responses are returned like any other, since the platform
/// reports failures inside the JSON envelope.
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if client construction fails.
    pub fn new() -> Result<Self, TransportError> {
        HttpTransportBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    pub(crate) fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<serde_json::Value, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.inner.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;
        let http_status = response.status();
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = http_status.as_u16(),
            "request completed"
        );

        let text = response.text().await.map_err(TransportError::from_reqwest)?;
        serde_json::from_str(&text).map_err(TransportError::Decode)
    }
}
