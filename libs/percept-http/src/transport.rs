use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP methods used by the Percept API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
    Patch,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled request, ready to be put on the wire.
///
/// The caller owns URL composition and header selection; the transport
/// only executes. `body`, when present, is an already-serialized JSON
/// document.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// The collaborator seam between the SDK core and the network.
///
/// Implementations must return the parsed JSON body regardless of the HTTP
/// status code: the platform carries application-level failures inside the
/// response envelope, and the SDK core inspects them there. Only genuine
/// transport problems (connect, timeout, unparseable body) are errors.
///
/// Retry policy, when any, belongs to the implementation; the SDK core
/// never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<serde_json::Value, TransportError>;
}
