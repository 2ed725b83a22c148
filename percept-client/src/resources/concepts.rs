//! Concept listing within an app.

use percept_http::Method;

use crate::auth::{AuthOverride, ResolvedAuth};
use crate::client::ClientInner;
use crate::endpoints;
use crate::error::ClientError;
use crate::pager;
use crate::response::ResponseWrapper;
use crate::urls::QueryValue;

use super::{LIST_ALL_PAGE_SIZE, drained_response, page_outcome};

/// Concepts of an app.
pub struct Concepts<'a> {
    inner: &'a ClientInner,
    auth: Option<AuthOverride>,
}

impl<'a> Concepts<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner, auth: None }
    }

    /// Run subsequent calls under a different identity.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthOverride) -> Self {
        self.auth = Some(auth);
        self
    }

    fn resolve(&self) -> ResolvedAuth {
        ResolvedAuth::resolve(&self.inner.defaults, self.auth.as_ref())
    }

    /// Fetch one page of the app's concepts.
    pub async fn list(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        let auth = self.resolve();
        let app_id = auth.require_app("concepts.list")?;
        self.inner
            .executor
            .execute(
                endpoints::CONCEPTS,
                Method::Get,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[
                    ("page", page.map(QueryValue::from)),
                    ("per_page", per_page.map(QueryValue::from)),
                ],
                None,
            )
            .await
    }

    /// Fetch every concept of the app, walking pages to exhaustion.
    pub async fn list_all(&self) -> Result<ResponseWrapper, ClientError> {
        let drained = pager::drain_offset(LIST_ALL_PAGE_SIZE, |page| async move {
            let wrapper = self.list(Some(page), Some(LIST_ALL_PAGE_SIZE)).await?;
            Ok(page_outcome(wrapper, "concepts"))
        })
        .await?;
        Ok(drained_response(drained, "concepts", self.inner.executor.pretty()))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use crate::client::PerceptClient;
    use crate::error::ClientError;

    fn client(server: &MockServer) -> PerceptClient {
        PerceptClient::builder("test-token")
            .user_id("u1")
            .app_id("a1")
            .base_url(server.base_url())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn list_is_app_scoped() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/concepts")
                .query_param("page", "3")
                .query_param("per_page", "25");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "concepts": [{"id": "dog"}]}));
        });

        let wrapper = client(&server)
            .concepts()
            .list(Some(3), Some(25))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(wrapper.data()["concepts"][0]["id"], "dog");
    }

    #[tokio::test]
    async fn list_without_app_scope_is_a_missing_identity() {
        let server = MockServer::start();
        let client = PerceptClient::builder("test-token")
            .user_id("u1")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let err = client.concepts().list(None, None).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingIdentity { .. }));
    }

    #[tokio::test]
    async fn list_all_stops_on_a_short_page() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/concepts")
                .query_param("page", "1");
            then.status(200).json_body(
                json!({"status": {"code": 10000}, "concepts": [{"id": "dog"}, {"id": "cat"}]}),
            );
        });

        let wrapper = client(&server).concepts().list_all().await.unwrap();
        mock.assert();
        assert!(wrapper.is_success());
        assert_eq!(wrapper.data()["concepts_count"], 2);
    }
}
