//! Platform response envelope handling.
//!
//! Every API response is a JSON object of the form
//! `{"status": {...}, ...payload}`. The SDK splits the two on receipt:
//! the status becomes a typed [`Status`], the rest of the object is kept
//! verbatim as the payload. A failing status is a value the caller
//! inspects, not an `Err`.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Status code the platform uses for success.
pub const SUCCESS_CODE: i64 = 10_000;

/// The `status` object of a platform envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Status {
    /// A synthesized success status, used by aggregating operations that
    /// combine many envelopes into one result.
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: SUCCESS_CODE,
            description: None,
            details: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// The most specific human-readable message available.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.details.as_deref().or(self.description.as_deref())
    }
}

/// A platform response: typed status plus the untouched payload.
///
/// The payload is the envelope with the `status` key removed and nothing
/// else altered; unknown fields survive round trips. Aggregating
/// operations build wrappers by hand via [`ResponseWrapper::synthesized`].
#[derive(Debug, Clone)]
pub struct ResponseWrapper {
    status: Status,
    data: serde_json::Value,
    pretty: bool,
}

impl ResponseWrapper {
    /// Split a live envelope into status and payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedEnvelope`] when the body is not an
    /// object, lacks a `status` key, or carries a status that does not
    /// parse.
    pub fn from_envelope(mut envelope: serde_json::Value, pretty: bool) -> Result<Self, ClientError> {
        let Some(object) = envelope.as_object_mut() else {
            return Err(ClientError::MalformedEnvelope(
                "response body is not a JSON object".to_owned(),
            ));
        };
        let status = object
            .remove("status")
            .ok_or_else(|| ClientError::MalformedEnvelope("missing 'status' key".to_owned()))?;
        let status: Status = serde_json::from_value(status)
            .map_err(|e| ClientError::MalformedEnvelope(format!("unparseable 'status': {e}")))?;
        Ok(Self {
            status,
            data: envelope,
            pretty,
        })
    }

    /// Assemble a wrapper without a wire envelope behind it.
    #[must_use]
    pub fn synthesized(status: Status, payload: serde_json::Value, pretty: bool) -> Self {
        Self {
            status,
            data: payload,
            pretty,
        }
    }

    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    #[must_use]
    pub fn status_code(&self) -> i64 {
        self.status.code
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.status.description.as_deref()
    }

    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.status.details.as_deref()
    }

    /// The payload: the envelope minus its `status` key.
    #[must_use]
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> serde_json::Value {
        self.data
    }

    /// The payload rendered as JSON text, pretty-printed when the client
    /// was configured for it.
    #[must_use]
    pub fn text(&self) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&self.data)
        } else {
            serde_json::to_string(&self.data)
        };
        // Serializing a Value cannot fail.
        rendered.unwrap_or_default()
    }
}
