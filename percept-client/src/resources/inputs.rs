//! Input ingestion, streaming, search, and bulk deletion.

use percept_http::Method;
use serde::Serialize;
use serde_json::{Value, json};

use crate::auth::{AuthOverride, ResolvedAuth};
use crate::client::ClientInner;
use crate::endpoints;
use crate::error::ClientError;
use crate::pager::{self, StepOutcome};
use crate::response::ResponseWrapper;
use crate::urls::QueryValue;

use super::{LIST_ALL_PAGE_SIZE, drained_response, item_id, page_outcome, pagination_value};

/// Upper bound the platform enforces on a single add or delete call.
pub const MAX_WRITE_BATCH: usize = 128;

/// Page size `delete_all` streams with.
pub(crate) const DELETE_ALL_PAGE_SIZE: u32 = 50;

/// A concept predicate for [`Inputs::search_by_concepts`].
#[derive(Debug, Clone, Serialize)]
pub struct ConceptFilter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ConceptFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Require the concept with a specific value (e.g. `0.0` for absence).
    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// Inputs of an app.
pub struct Inputs<'a> {
    inner: &'a ClientInner,
    auth: Option<AuthOverride>,
}

impl<'a> Inputs<'a> {
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

    fn user_app_id(auth: &ResolvedAuth, app_id: &str) -> Value {
        json!({"user_id": auth.user_id(), "app_id": app_id})
    }

    /// Add a batch of inputs. Each element is the `data` object of one
    /// input (media reference, concepts, metadata).
    pub async fn add(&self, inputs: &[Value]) -> Result<ResponseWrapper, ClientError> {
        if inputs.is_empty() {
            return Err(ClientError::Validation("no inputs to add".to_owned()));
        }
        if inputs.len() > MAX_WRITE_BATCH {
            return Err(ClientError::Validation(format!(
                "at most {MAX_WRITE_BATCH} inputs per call, got {}",
                inputs.len()
            )));
        }
        let auth = self.resolve();
        let app_id = auth.require_app("inputs.add")?;
        let wrapped: Vec<Value> = inputs.iter().map(|data| json!({"data": data})).collect();
        let body = json!({
            "user_app_id": Self::user_app_id(&auth, app_id),
            "inputs": wrapped,
        });
        self.inner
            .executor
            .execute(
                endpoints::INPUTS,
                Method::Post,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[],
                Some(&body),
            )
            .await
    }

    /// Fetch one page of the app's inputs, cursor style. `last_id` is the
    /// id of the last input of the previous page; omit it for the first
    /// page.
    pub async fn stream(
        &self,
        per_page: Option<u32>,
        last_id: Option<&str>,
    ) -> Result<ResponseWrapper, ClientError> {
        let auth = self.resolve();
        let app_id = auth.require_app("inputs.stream")?;
        self.inner
            .executor
            .execute(
                endpoints::INPUTS_STREAM,
                Method::Get,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[
                    ("per_page", per_page.map(QueryValue::from)),
                    ("last_id", last_id.map(QueryValue::from)),
                ],
                None,
            )
            .await
    }

    /// Fetch every input of the app, streaming pages to exhaustion.
    pub async fn list_all(&self) -> Result<ResponseWrapper, ClientError> {
        let drained = pager::drain_stream(
            LIST_ALL_PAGE_SIZE,
            |last_id| async move {
                let wrapper = self
                    .stream(Some(LIST_ALL_PAGE_SIZE), last_id.as_deref())
                    .await?;
                Ok(page_outcome(wrapper, "inputs"))
            },
            item_id,
        )
        .await?;
        Ok(drained_response(drained, "inputs", self.inner.executor.pretty()))
    }

    /// Delete inputs by id.
    pub async fn delete_by_ids(&self, ids: &[String]) -> Result<ResponseWrapper, ClientError> {
        if ids.is_empty() {
            return Err(ClientError::Validation("no input ids to delete".to_owned()));
        }
        if ids.len() > MAX_WRITE_BATCH {
            return Err(ClientError::Validation(format!(
                "at most {MAX_WRITE_BATCH} ids per call, got {}",
                ids.len()
            )));
        }
        let auth = self.resolve();
        let app_id = auth.require_app("inputs.delete_by_ids")?;
        let body = json!({
            "user_app_id": Self::user_app_id(&auth, app_id),
            "ids": ids,
        });
        self.inner
            .executor
            .execute(
                endpoints::INPUTS,
                Method::Delete,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[],
                Some(&body),
            )
            .await
    }

    /// Delete every input of the app: stream a page, delete its ids,
    /// repeat until the app is empty. The result carries the number of
    /// inputs deleted; a platform failure stops the walk and reports the
    /// count deleted so far under the failing status.
    pub async fn delete_all(&self) -> Result<ResponseWrapper, ClientError> {
        let drained = pager::drain_stream_each(
            DELETE_ALL_PAGE_SIZE,
            |last_id| async move {
                let wrapper = self
                    .stream(Some(DELETE_ALL_PAGE_SIZE), last_id.as_deref())
                    .await?;
                Ok(page_outcome(wrapper, "inputs"))
            },
            item_id,
            |batch: Vec<Value>| async move {
                let ids: Vec<String> = batch.iter().filter_map(item_id).collect();
                let wrapper = self.delete_by_ids(&ids).await?;
                if wrapper.is_success() {
                    Ok(StepOutcome::Done)
                } else {
                    Ok(StepOutcome::Failed(wrapper.status().clone()))
                }
            },
        )
        .await?;

        let pretty = self.inner.executor.pretty();
        Ok(match drained {
            pager::DrainedCount::Complete { count, .. } => ResponseWrapper::synthesized(
                crate::response::Status::success(),
                json!({"deleted_inputs_count": count}),
                pretty,
            ),
            pager::DrainedCount::Aborted { status, partial } => ResponseWrapper::synthesized(
                status,
                json!({"deleted_inputs_count": partial}),
                pretty,
            ),
        })
    }

    /// Search the app's inputs by concept predicates.
    pub async fn search_by_concepts(
        &self,
        concepts: &[ConceptFilter],
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        if concepts.is_empty() {
            return Err(ClientError::Validation("no concepts to search by".to_owned()));
        }
        let query = json!({
            "filters": [{"annotation": {"data": {"concepts": concepts}}}],
        });
        self.searches(query, None, page, per_page, "inputs.search_by_concepts")
            .await
    }

    /// Rank the app's inputs by visual similarity to an image URL.
    pub async fn rank_by_image_url(
        &self,
        url: &str,
        min_value: Option<f64>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        if url.is_empty() {
            return Err(ClientError::Validation("image url must not be empty".to_owned()));
        }
        let query = json!({
            "ranks": [{"annotation": {"data": {"image": {"url": url}}}}],
        });
        self.searches(query, min_value, page, per_page, "inputs.rank_by_image_url")
            .await
    }

    /// Rank the app's inputs by similarity to one of its own inputs.
    pub async fn rank_by_input_id(
        &self,
        input_id: &str,
        min_value: Option<f64>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        if input_id.is_empty() {
            return Err(ClientError::Validation("input id must not be empty".to_owned()));
        }
        let query = json!({
            "ranks": [{"annotation": {"input_id": input_id}}],
        });
        self.searches(query, min_value, page, per_page, "inputs.rank_by_input_id")
            .await
    }

    async fn searches(
        &self,
        query: Value,
        min_value: Option<f64>,
        page: Option<u32>,
        per_page: Option<u32>,
        operation: &'static str,
    ) -> Result<ResponseWrapper, ClientError> {
        let auth = self.resolve();
        let app_id = auth.require_app(operation)?;

        let mut search = serde_json::Map::new();
        search.insert("query".to_owned(), query);
        if let Some(min_value) = min_value {
            search.insert("min_value".to_owned(), json!(min_value));
        }

        let mut body = serde_json::Map::new();
        body.insert("user_app_id".to_owned(), Self::user_app_id(&auth, app_id));
        if let Some(pagination) = pagination_value(page, per_page) {
            body.insert("pagination".to_owned(), pagination);
        }
        body.insert("searches".to_owned(), json!([search]));

        self.inner
            .executor
            .execute(
                endpoints::INPUTS_SEARCHES,
                Method::Post,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[],
                Some(&Value::Object(body)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;
    use serde_json::{Value, json};

    use super::ConceptFilter;
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

    fn input_batch(count: usize, offset: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({"id": format!("in-{}", offset + i), "data": {}}))
            .collect()
    }

    #[tokio::test]
    async fn add_wraps_each_item_in_a_data_object() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v2/users/u1/apps/a1/inputs").json_body(json!({
                "user_app_id": {"user_id": "u1", "app_id": "a1"},
                "inputs": [{"data": {"image": {"url": "https://pics.test/1.jpg"}}}],
            }));
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": []}));
        });

        client(&server)
            .inputs()
            .add(&[json!({"image": {"url": "https://pics.test/1.jpg"}})])
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn add_enforces_the_batch_limit() {
        let server = MockServer::start();
        let too_many: Vec<Value> = (0..129).map(|i| json!({"n": i})).collect();
        let err = client(&server).inputs().add(&too_many).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_rejects_an_empty_id_list() {
        let server = MockServer::start();
        let err = client(&server).inputs().delete_by_ids(&[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn stream_threads_cursor_parameters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/inputs/stream")
                .query_param("per_page", "30")
                .query_param("last_id", "in-29");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": []}));
        });

        client(&server)
            .inputs()
            .stream(Some(30), Some("in-29"))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn delete_all_deletes_page_by_page() {
        let server = MockServer::start();
        let page1 = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/inputs/stream")
                .query_param("per_page", "50")
                .query_param_missing("last_id");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": input_batch(50, 0)}));
        });
        let page2 = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/inputs/stream")
                .query_param("last_id", "in-49");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": input_batch(12, 50)}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/v2/users/u1/apps/a1/inputs");
            then.status(200).json_body(json!({"status": {"code": 10000}}));
        });

        let wrapper = client(&server).inputs().delete_all().await.unwrap();
        page1.assert();
        page2.assert();
        delete.assert_hits(2);
        assert!(wrapper.is_success());
        assert_eq!(wrapper.data()["deleted_inputs_count"], 62);
    }

    #[tokio::test]
    async fn delete_all_reports_partial_progress_on_failure() {
        let server = MockServer::start();
        let _stream = server.mock(|when, then| {
            when.method(GET).path("/v2/users/u1/apps/a1/inputs/stream");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": input_batch(50, 0)}));
        });
        let _delete = server.mock(|when, then| {
            when.method(DELETE).path("/v2/users/u1/apps/a1/inputs");
            then.status(400)
                .json_body(json!({"status": {"code": 40001, "description": "delete rejected"}}));
        });

        let wrapper = client(&server).inputs().delete_all().await.unwrap();
        assert!(!wrapper.is_success());
        assert_eq!(wrapper.status_code(), 40001);
        assert_eq!(wrapper.data()["deleted_inputs_count"], 0);
    }

    #[tokio::test]
    async fn list_all_streams_to_exhaustion() {
        let server = MockServer::start();
        let _page1 = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/inputs/stream")
                .query_param("per_page", "100")
                .query_param_missing("last_id");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": input_batch(100, 0)}));
        });
        let _page2 = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps/a1/inputs/stream")
                .query_param("last_id", "in-99");
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "inputs": input_batch(3, 100)}));
        });

        let wrapper = client(&server).inputs().list_all().await.unwrap();
        assert!(wrapper.is_success());
        assert_eq!(wrapper.data()["inputs_count"], 103);
    }

    #[tokio::test]
    async fn concept_search_builds_the_filter_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/users/u1/apps/a1/inputs/searches")
                .json_body(json!({
                    "user_app_id": {"user_id": "u1", "app_id": "a1"},
                    "pagination": {"page": 1, "per_page": 20},
                    "searches": [{
                        "query": {"filters": [{"annotation": {"data": {"concepts": [
                            {"name": "dog", "value": 1.0},
                        ]}}}]},
                    }],
                }));
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "hits": []}));
        });

        client(&server)
            .inputs()
            .search_by_concepts(&[ConceptFilter::new("dog").value(1.0)], Some(1), Some(20))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn rank_includes_min_value_only_when_given() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/users/u1/apps/a1/inputs/searches")
                .json_body(json!({
                    "user_app_id": {"user_id": "u1", "app_id": "a1"},
                    "searches": [{
                        "query": {"ranks": [{"annotation": {"input_id": "in-5"}}]},
                        "min_value": 0.8,
                    }],
                }));
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "hits": []}));
        });

        client(&server)
            .inputs()
            .rank_by_input_id("in-5", Some(0.8), None, None)
            .await
            .unwrap();
        mock.assert();
    }
}
