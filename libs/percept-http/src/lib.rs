//! HTTP transport layer for the Percept client SDK
//!
//! The SDK core talks to the platform through the [`Transport`] trait:
//! "send an HTTP request with method, URL, headers and optional body;
//! return the parsed JSON response or fail with a [`TransportError`]".
//! This crate defines that seam plus a reqwest-backed default
//! implementation, [`HttpTransport`].
//!
//! Platform-level failures are not transport failures: the Percept API
//! reports them inside the JSON envelope (`status.code`), so [`Transport`]
//! implementations must return the parsed body for non-2xx responses too.
//!
//! # Example
//!
//! ```ignore
//! use percept_http::{HttpTransport, Transport, TransportRequest, Method};
//!
//! let transport = HttpTransport::builder()
//!     .timeout(std::time::Duration::from_secs(10))
//!     .build()?;
//!
//! let body = transport
//!     .send(TransportRequest::new(Method::Get, "https://api.percept.ai/v2/users/me/apps"))
//!     .await?;
//! ```

#![forbid(unsafe_code)]

mod builder;
mod client;
mod error;
mod transport;

pub use builder::HttpTransportBuilder;
pub use client::HttpTransport;
pub use error::TransportError;
pub use transport::{Method, Transport, TransportRequest};
