//! The client: construction, configuration, and resource accessors.

use std::sync::Arc;

use percept_http::{HttpTransport, Transport};

use crate::auth::Credentials;
use crate::endpoints::EndpointTable;
use crate::error::ClientError;
use crate::request::RequestExecutor;
use crate::resources::{Apps, Concepts, Inputs, Models, Transfer, Usage};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.percept.ai";

pub(crate) struct ClientInner {
    pub(crate) executor: RequestExecutor,
    pub(crate) defaults: Credentials,
}

/// Handle to the platform. Cheap to clone; all clones share one transport
/// and one configuration.
///
/// Operations live on the resource accessors:
///
/// ```ignore
/// let client = PerceptClient::builder(token).app_id("my-app").build()?;
/// let concepts = client.concepts().list_all().await?;
/// ```
#[derive(Clone)]
pub struct PerceptClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for PerceptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerceptClient").finish_non_exhaustive()
    }
}

impl PerceptClient {
    /// Start configuring a client for the given API token.
    pub fn builder(token: impl Into<String>) -> PerceptClientBuilder {
        PerceptClientBuilder::new(token)
    }

    /// A client with default configuration against the production host.
    ///
    /// # Errors
    ///
    /// Fails if the token is empty or the HTTP transport cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder(token).build()
    }

    #[must_use]
    pub fn apps(&self) -> Apps<'_> {
        Apps::new(&self.inner)
    }

    #[must_use]
    pub fn models(&self) -> Models<'_> {
        Models::new(&self.inner)
    }

    #[must_use]
    pub fn inputs(&self) -> Inputs<'_> {
        Inputs::new(&self.inner)
    }

    #[must_use]
    pub fn concepts(&self) -> Concepts<'_> {
        Concepts::new(&self.inner)
    }

    #[must_use]
    pub fn usage(&self) -> Usage<'_> {
        Usage::new(&self.inner)
    }

    #[must_use]
    pub fn transfer(&self) -> Transfer<'_> {
        Transfer::new(&self.inner)
    }

    /// The default identity calls run under.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.inner.defaults
    }
}

/// Builder for [`PerceptClient`].
#[must_use = "PerceptClientBuilder does nothing until .build() is called"]
pub struct PerceptClientBuilder {
    credentials: Credentials,
    base_url: String,
    endpoints: EndpointTable,
    pretty_print: bool,
    transport: Option<Arc<dyn Transport>>,
}

impl PerceptClientBuilder {
    fn new(token: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(token),
            base_url: DEFAULT_BASE_URL.to_owned(),
            endpoints: EndpointTable::builtin(),
            pretty_print: false,
            transport: None,
        }
    }

    /// Account the default identity belongs to. Defaults to `"me"`, the
    /// account owning the token.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.credentials = self.credentials.user_id(user_id);
        self
    }

    /// App the default identity is scoped to. Without one, only
    /// account-level operations work unless a per-call override supplies
    /// an app.
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.credentials = self.credentials.app_id(app_id);
        self
    }

    /// Target a different API host.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the endpoint table, rerouting every operation.
    pub fn endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Render [`crate::ResponseWrapper::text`] with indentation.
    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    /// Substitute the transport, e.g. an instrumented or recorded one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails on an empty token, or with [`ClientError::Transport`] if the
    /// default HTTP transport cannot be constructed.
    pub fn build(self) -> Result<PerceptClient, ClientError> {
        if self.credentials.token.is_empty() {
            return Err(ClientError::Validation("api token must not be empty".to_owned()));
        }
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };
        let executor =
            RequestExecutor::new(transport, self.base_url, self.endpoints, self.pretty_print);
        Ok(PerceptClient {
            inner: Arc::new(ClientInner {
                executor,
                defaults: self.credentials,
            }),
        })
    }
}
