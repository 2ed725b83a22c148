use percept_http::TransportError;
use thiserror::Error;

/// SDK error taxonomy.
///
/// Application-level failures reported by the platform are deliberately
/// absent here: they are carried by [`crate::ResponseWrapper`] as values.
/// Everything in this enum is either a caller mistake caught before the
/// network, a contract violation in the SDK's own configuration, or a
/// transport failure surfaced unmodified.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// Caller-supplied arguments violate an operation's precondition.
    /// Never retried; raised before any network call.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The endpoint name is not registered in the endpoint table.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The endpoint template references a placeholder the caller did not
    /// supply (after dropping absent-valued entries).
    #[error("endpoint '{endpoint}' is missing path variable '{variable}'")]
    MissingPathVariable { endpoint: String, variable: String },

    /// An app-scoped operation resolved an identity without an app id.
    #[error("operation '{operation}' requires an app id, but none was resolved")]
    MissingIdentity { operation: &'static str },

    /// The response is not a well-formed platform envelope.
    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// Underlying network/HTTP failure, surfaced as-is and never retried
    /// by this layer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
