//! Single-request pipeline: endpoint lookup, URL assembly, headers, send,
//! envelope split.

use std::sync::Arc;

use percept_http::{Method, Transport, TransportRequest};

use crate::auth::ResolvedAuth;
use crate::endpoints::EndpointTable;
use crate::error::ClientError;
use crate::response::ResponseWrapper;
use crate::urls::{self, QueryValue};

/// Executes one platform request end to end.
///
/// Holds everything that is fixed for the client's lifetime: the transport,
/// the base URL, the endpoint table, and the pretty-print flag passed down
/// to every wrapper it produces.
pub(crate) struct RequestExecutor {
    transport: Arc<dyn Transport>,
    base_url: String,
    endpoints: EndpointTable,
    pretty: bool,
}

impl RequestExecutor {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        endpoints: EndpointTable,
        pretty: bool,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            transport,
            base_url,
            endpoints,
            pretty,
        }
    }

    pub(crate) fn pretty(&self) -> bool {
        self.pretty
    }

    pub(crate) async fn execute(
        &self,
        endpoint: &str,
        method: Method,
        auth: &ResolvedAuth,
        path_vars: &[(&str, Option<&str>)],
        query: &[(&str, Option<QueryValue>)],
        body: Option<&serde_json::Value>,
    ) -> Result<ResponseWrapper, ClientError> {
        let template = self.endpoints.template(endpoint)?;
        let mut url = String::with_capacity(self.base_url.len() + template.len());
        url.push_str(&self.base_url);
        url.push_str(&urls::fill_template(endpoint, template, path_vars)?);
        urls::append_query(&mut url, query);

        let mut request = TransportRequest::new(method, url)
            .header("Authorization", format!("Key {}", auth.token()));
        if let Some(body) = body {
            let serialized = serde_json::to_string(body)
                .map_err(|e| ClientError::Validation(format!("unserializable request body: {e}")))?;
            request = request
                .header("Content-Type", "application/json")
                .body(serialized);
        }

        tracing::debug!(endpoint, method = %method, "sending platform request");
        let envelope = self.transport.send(request).await?;
        ResponseWrapper::from_envelope(envelope, self.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use percept_http::HttpTransport;
    use serde_json::json;

    use crate::auth::Credentials;
    use crate::endpoints;

    fn executor(base_url: &str) -> RequestExecutor {
        RequestExecutor::new(
            Arc::new(HttpTransport::new().unwrap()),
            base_url,
            EndpointTable::builtin(),
            false,
        )
    }

    fn auth() -> ResolvedAuth {
        ResolvedAuth::resolve(
            &Credentials::new("secret").user_id("u1").app_id("a1"),
            None,
        )
    }

    #[tokio::test]
    async fn assembles_url_auth_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/users/u1/apps")
                .header("authorization", "Key secret")
                .header("content-type", "application/json")
                .json_body(json!({"apps": [{"id": "new-app"}]}));
            then.status(200)
                .json_body(json!({"status": {"code": 10000}, "apps": [{"id": "new-app"}]}));
        });

        let wrapper = executor(&server.base_url())
            .execute(
                endpoints::APPS,
                Method::Post,
                &auth(),
                &[("user_id", Some("u1"))],
                &[],
                Some(&json!({"apps": [{"id": "new-app"}]})),
            )
            .await
            .unwrap();

        mock.assert();
        assert!(wrapper.is_success());
        assert_eq!(wrapper.data()["apps"][0]["id"], "new-app");
    }

    #[tokio::test]
    async fn bodiless_request_sends_no_content_type() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/users/u1/apps")
                .query_param("page", "2")
                .query_param("per_page", "10");
            then.status(200).json_body(json!({"status": {"code": 10000}, "apps": []}));
        });

        executor(&server.base_url())
            .execute(
                endpoints::APPS,
                Method::Get,
                &auth(),
                &[("user_id", Some("u1"))],
                &[
                    ("page", Some(QueryValue::from(2u32))),
                    ("per_page", Some(QueryValue::from(10u32))),
                ],
                None,
            )
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn trailing_base_url_slash_is_tolerated() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v2/users/u1/apps");
            then.status(200).json_body(json!({"status": {"code": 10000}, "apps": []}));
        });

        executor(&format!("{}/", server.base_url()))
            .execute(
                endpoints::APPS,
                Method::Get,
                &auth(),
                &[("user_id", Some("u1"))],
                &[],
                None,
            )
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn application_failure_is_returned_as_value() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/v2/users/u1/apps");
            then.status(400)
                .json_body(json!({"status": {"code": 11102, "description": "Invalid request"}}));
        });

        let wrapper = executor(&server.base_url())
            .execute(
                endpoints::APPS,
                Method::Get,
                &auth(),
                &[("user_id", Some("u1"))],
                &[],
                None,
            )
            .await
            .unwrap();

        assert!(!wrapper.is_success());
        assert_eq!(wrapper.status_code(), 11102);
    }

    #[tokio::test]
    async fn unknown_endpoint_fails_before_the_network() {
        let err = executor("http://127.0.0.1:1")
            .execute("nonexistent", Method::Get, &auth(), &[], &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownEndpoint(_)));
    }
}
