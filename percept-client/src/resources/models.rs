//! Model operations: inference, training, listing, lookup, search.

use percept_http::Method;
use serde::Serialize;
use serde_json::{Value, json};

use crate::auth::{AuthOverride, ResolvedAuth};
use crate::client::ClientInner;
use crate::endpoints;
use crate::error::ClientError;
use crate::pager;
use crate::response::ResponseWrapper;
use crate::urls::QueryValue;

use super::{LIST_ALL_PAGE_SIZE, drained_response, page_outcome, pagination_value};

/// One input of a predict call.
///
/// The platform accepts several media shapes under `data`; the
/// constructors cover the common ones and [`PredictInput::raw`] passes an
/// arbitrary data object through.
#[derive(Debug, Clone, Serialize)]
pub struct PredictInput {
    data: Value,
}

impl PredictInput {
    /// Predict on an image fetched by the platform from a URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            data: json!({"image": {"url": url.into()}}),
        }
    }

    /// Predict on inline base64-encoded image bytes.
    pub fn image_base64(base64: impl Into<String>) -> Self {
        Self {
            data: json!({"image": {"base64": base64.into()}}),
        }
    }

    /// Pass an arbitrary `data` object through unchanged.
    #[must_use]
    pub fn raw(data: Value) -> Self {
        Self { data }
    }
}

/// Models of an app, plus the account-independent predict and search
/// surfaces.
pub struct Models<'a> {
    inner: &'a ClientInner,
    auth: Option<AuthOverride>,
}

impl<'a> Models<'a> {
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

    /// Run inference against a model.
    ///
    /// With `version_id` the call is pinned to that exact model version;
    /// without it the platform picks the model's latest version. An empty
    /// version string is rejected rather than silently unpinning.
    pub async fn predict(
        &self,
        model_id: &str,
        inputs: &[PredictInput],
        version_id: Option<&str>,
    ) -> Result<ResponseWrapper, ClientError> {
        if model_id.is_empty() {
            return Err(ClientError::Validation("model id must not be empty".to_owned()));
        }
        if inputs.is_empty() {
            return Err(ClientError::Validation(
                "predict requires at least one input".to_owned(),
            ));
        }
        if version_id == Some("") {
            return Err(ClientError::Validation(
                "model version id must not be empty".to_owned(),
            ));
        }
        let auth = self.resolve();
        let app_id = auth.require_app("models.predict")?;
        let body = json!({
            "user_app_id": {"user_id": auth.user_id(), "app_id": app_id},
            "inputs": inputs,
        });
        let (endpoint, path_vars): (&str, Vec<(&str, Option<&str>)>) = match version_id {
            Some(version_id) => (
                endpoints::MODELS_PREDICT_VERSION,
                vec![("model_id", Some(model_id)), ("version_id", Some(version_id))],
            ),
            None => (endpoints::MODELS_PREDICT, vec![("model_id", Some(model_id))]),
        };
        self.inner
            .executor
            .execute(endpoint, Method::Post, &auth, &path_vars, &[], Some(&body))
            .await
    }

    /// Kick off training of a new version of the model.
    pub async fn train(&self, model_id: &str) -> Result<ResponseWrapper, ClientError> {
        if model_id.is_empty() {
            return Err(ClientError::Validation("model id must not be empty".to_owned()));
        }
        let auth = self.resolve();
        let app_id = auth.require_app("models.train")?;
        self.inner
            .executor
            .execute(
                endpoints::MODELS_TRAIN,
                Method::Post,
                &auth,
                &[
                    ("user_id", Some(auth.user_id())),
                    ("app_id", Some(app_id)),
                    ("model_id", Some(model_id)),
                ],
                &[],
                None,
            )
            .await
    }

    /// Fetch a single model by id.
    pub async fn get(&self, model_id: &str) -> Result<ResponseWrapper, ClientError> {
        if model_id.is_empty() {
            return Err(ClientError::Validation("model id must not be empty".to_owned()));
        }
        let auth = self.resolve();
        let app_id = auth.require_app("models.get")?;
        self.inner
            .executor
            .execute(
                endpoints::MODELS_ITEM,
                Method::Get,
                &auth,
                &[
                    ("user_id", Some(auth.user_id())),
                    ("app_id", Some(app_id)),
                    ("model_id", Some(model_id)),
                ],
                &[],
                None,
            )
            .await
    }

    /// Fetch one page of the app's models.
    pub async fn list(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        let auth = self.resolve();
        let app_id = auth.require_app("models.list")?;
        self.inner
            .executor
            .execute(
                endpoints::MODELS,
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

    /// Fetch every model of the app, walking pages to exhaustion.
    pub async fn list_all(&self) -> Result<ResponseWrapper, ClientError> {
        let drained = pager::drain_offset(LIST_ALL_PAGE_SIZE, |page| async move {
            let wrapper = self.list(Some(page), Some(LIST_ALL_PAGE_SIZE)).await?;
            Ok(page_outcome(wrapper, "models"))
        })
        .await?;
        Ok(drained_response(drained, "models", self.inner.executor.pretty()))
    }

    /// Search publicly available models by name.
    pub async fn search(
        &self,
        name: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        if name.is_empty() {
            return Err(ClientError::Validation("model query must not be empty".to_owned()));
        }
        let auth = self.resolve();
        let mut body = serde_json::Map::new();
        body.insert("model_query".to_owned(), json!({"name": name}));
        if let Some(pagination) = pagination_value(page, per_page) {
            body.insert("pagination".to_owned(), pagination);
        }
        self.inner
            .executor
            .execute(
                endpoints::MODELS_SEARCHES,
                Method::Post,
                &auth,
                &[],
                &[],
                Some(&Value::Object(body)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    use super::PredictInput;
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
    async fn predict_targets_the_latest_version_by_default() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v2/models/general/outputs").json_body(json!({
                "user_app_id": {"user_id": "u1", "app_id": "a1"},
                "inputs": [{"data": {"image": {"url": "https://pics.test/dog.jpg"}}}],
            }));
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "outputs": []}));
        });

        client(&server)
            .models()
            .predict(
                "general",
                &[PredictInput::image_url("https://pics.test/dog.jpg")],
                None,
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn predict_pins_an_explicit_version() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v2/models/general/versions/v9/outputs");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "outputs": []}));
        });

        client(&server)
            .models()
            .predict(
                "general",
                &[PredictInput::image_base64("aGVsbG8=")],
                Some("v9"),
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn predict_rejects_an_empty_version_id() {
        let server = MockServer::start();
        let err = client(&server)
            .models()
            .predict("general", &[PredictInput::image_url("u")], Some(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn predict_requires_inputs() {
        let server = MockServer::start();
        let err = client(&server)
            .models()
            .predict("general", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn predict_requires_an_app_scope() {
        let server = MockServer::start();
        let client = PerceptClient::builder("test-token")
            .user_id("u1")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let err = client
            .models()
            .predict("general", &[PredictInput::image_url("u")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingIdentity { .. }));
    }

    #[tokio::test]
    async fn train_posts_a_new_version() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v2/users/u1/apps/a1/models/mine/versions");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "model": {"id": "mine"}}));
        });

        client(&server).models().train("mine").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn search_carries_query_and_pagination() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v2/models/searches").json_body(json!({
                "model_query": {"name": "general"},
                "pagination": {"page": 1, "per_page": 5},
            }));
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "models": []}));
        });

        client(&server)
            .models()
            .search("general", Some(1), Some(5))
            .await
            .unwrap();
        mock.assert();
    }
}
