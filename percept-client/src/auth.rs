//! Identity handling: default credentials, per-call overrides, and the
//! immutable identity a single request runs under.

use crate::error::ClientError;

/// The account the default identity falls back to when none is given.
pub const DEFAULT_USER_ID: &str = "me";

/// Client-wide default identity: an API token plus the user/app scope it
/// operates in.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// API token sent as `Authorization: Key {token}`.
    pub token: String,
    /// Account the scope belongs to; defaults to [`DEFAULT_USER_ID`].
    pub user_id: String,
    /// App within the account. Account-level operations run without one.
    pub app_id: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: DEFAULT_USER_ID.to_owned(),
            app_id: None,
        }
    }

    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    #[must_use]
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }
}

/// Per-call identity override.
///
/// Overriding is all-or-nothing for the user/app pair: an override always
/// names its own `user_id` (and optionally `app_id`), so a call can never
/// mix the default user with an overridden app. The token alone may be
/// omitted, in which case the client's default token is used.
#[derive(Debug, Clone)]
pub struct AuthOverride {
    token: Option<String>,
    user_id: String,
    app_id: Option<String>,
}

impl AuthOverride {
    /// Override the scope only, keeping the default token.
    pub fn scope(user_id: impl Into<String>, app_id: Option<String>) -> Self {
        Self {
            token: None,
            user_id: user_id.into(),
            app_id,
        }
    }

    /// Use a different token for this call.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl From<&Credentials> for AuthOverride {
    fn from(credentials: &Credentials) -> Self {
        Self {
            token: Some(credentials.token.clone()),
            user_id: credentials.user_id.clone(),
            app_id: credentials.app_id.clone(),
        }
    }
}

/// The identity a single request runs under. Resolved once per call and
/// never mutated afterwards; retries of the surrounding operation resolve
/// afresh.
#[derive(Debug, Clone)]
pub struct ResolvedAuth {
    token: String,
    user_id: String,
    app_id: Option<String>,
}

impl ResolvedAuth {
    pub(crate) fn resolve(defaults: &Credentials, auth: Option<&AuthOverride>) -> Self {
        match auth {
            None => Self {
                token: defaults.token.clone(),
                user_id: defaults.user_id.clone(),
                app_id: defaults.app_id.clone(),
            },
            Some(auth) => Self {
                token: auth.token.clone().unwrap_or_else(|| defaults.token.clone()),
                user_id: auth.user_id.clone(),
                app_id: auth.app_id.clone(),
            },
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// The app id, or [`ClientError::MissingIdentity`] for operations that
    /// cannot run account-wide.
    pub(crate) fn require_app(&self, operation: &'static str) -> Result<&str, ClientError> {
        self.app_id
            .as_deref()
            .ok_or(ClientError::MissingIdentity { operation })
    }
}
