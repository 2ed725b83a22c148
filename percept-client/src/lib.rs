//! Client SDK for the Percept computer-vision platform API
//!
//! This crate turns the platform's HTTP surface into typed method calls:
//! application management, model inference, input ingestion, concept
//! listing, usage reporting, and cross-account data transfer.
//!
//! The entry point is [`PerceptClient`]; resource families hang off it:
//!
//! ```ignore
//! use percept_client::PerceptClient;
//!
//! let client = PerceptClient::builder("my-api-key")
//!     .user_id("my-user")
//!     .app_id("my-app")
//!     .build()?;
//!
//! let apps = client.apps().list_all().await?;
//! println!("{}", apps.text());
//! ```
//!
//! Every operation returns a [`ResponseWrapper`]. Application-level
//! failures (a non-success `status.code` in the platform envelope) are
//! normal, inspectable results; only transport failures and contract
//! violations (unknown endpoint, missing identity, invalid arguments)
//! surface as [`ClientError`].
//!
//! Aggregating operations (`list_all`, `delete_all`, transfer) drive the
//! single-page primitives to exhaustion, strictly sequentially, and
//! synthesize one combined result.

#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod resources;
pub mod response;

mod pager;
mod request;
mod urls;

pub use auth::{AuthOverride, Credentials, ResolvedAuth};
pub use client::{DEFAULT_BASE_URL, PerceptClient, PerceptClientBuilder};
pub use endpoints::EndpointTable;
pub use error::ClientError;
pub use resources::{
    Apps, ConceptFilter, Concepts, Inputs, MAX_WRITE_BATCH, Models, PredictInput, Transfer,
    TransferOptions, Usage, UsageRange, UsageWindow,
};
pub use response::{ResponseWrapper, SUCCESS_CODE, Status};
