//! Application management: create, get, list, delete.

use percept_http::Method;
use serde_json::json;

use crate::auth::{AuthOverride, ResolvedAuth};
use crate::client::ClientInner;
use crate::endpoints;
use crate::error::ClientError;
use crate::pager;
use crate::response::ResponseWrapper;
use crate::urls::QueryValue;

use super::{LIST_ALL_PAGE_SIZE, drained_response, page_outcome};

/// Apps of an account.
pub struct Apps<'a> {
    inner: &'a ClientInner,
    auth: Option<AuthOverride>,
}

impl<'a> Apps<'a> {
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

    /// Create an app with the given id.
    pub async fn create(&self, app_id: &str) -> Result<ResponseWrapper, ClientError> {
        if app_id.is_empty() {
            return Err(ClientError::Validation("app id must not be empty".to_owned()));
        }
        let auth = self.resolve();
        self.inner
            .executor
            .execute(
                endpoints::APPS,
                Method::Post,
                &auth,
                &[("user_id", Some(auth.user_id()))],
                &[],
                Some(&json!({"apps": [{"id": app_id}]})),
            )
            .await
    }

    /// Fetch a single app by id.
    pub async fn get(&self, app_id: &str) -> Result<ResponseWrapper, ClientError> {
        if app_id.is_empty() {
            return Err(ClientError::Validation("app id must not be empty".to_owned()));
        }
        let auth = self.resolve();
        self.inner
            .executor
            .execute(
                endpoints::APPS_ITEM,
                Method::Get,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[],
                None,
            )
            .await
    }

    /// Fetch one page of the account's apps.
    pub async fn list(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ResponseWrapper, ClientError> {
        let auth = self.resolve();
        self.inner
            .executor
            .execute(
                endpoints::APPS,
                Method::Get,
                &auth,
                &[("user_id", Some(auth.user_id()))],
                &[
                    ("page", page.map(QueryValue::from)),
                    ("per_page", per_page.map(QueryValue::from)),
                ],
                None,
            )
            .await
    }

    /// Fetch every app of the account, walking pages to exhaustion.
    pub async fn list_all(&self) -> Result<ResponseWrapper, ClientError> {
        let drained = pager::drain_offset(LIST_ALL_PAGE_SIZE, |page| async move {
            let wrapper = self.list(Some(page), Some(LIST_ALL_PAGE_SIZE)).await?;
            Ok(page_outcome(wrapper, "apps"))
        })
        .await?;
        Ok(drained_response(drained, "apps", self.inner.executor.pretty()))
    }

    /// Delete an app by id.
    pub async fn delete(&self, app_id: &str) -> Result<ResponseWrapper, ClientError> {
        if app_id.is_empty() {
            return Err(ClientError::Validation("app id must not be empty".to_owned()));
        }
        let auth = self.resolve();
        self.inner
            .executor
            .execute(
                endpoints::APPS_ITEM,
                Method::Delete,
                &auth,
                &[("user_id", Some(auth.user_id())), ("app_id", Some(app_id))],
                &[],
                None,
            )
            .await
    }
}
