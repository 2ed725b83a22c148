//! Named endpoint registry.
//!
//! Operations never hardcode URL paths; they look up a template by name in
//! the table the client was constructed with. The table is an immutable
//! value: swapping it at construction time redirects the whole SDK (useful
//! for staging hosts or API evolution) without touching operation code.

use indexmap::IndexMap;

use crate::error::ClientError;

/// Apps collection under an account: list, create.
pub const APPS: &str = "apps";
/// Single app under an account: get, delete.
pub const APPS_ITEM: &str = "apps__item";
/// Concepts collection of an app.
pub const CONCEPTS: &str = "concepts";
/// Inputs collection of an app: add, delete-by-ids.
pub const INPUTS: &str = "inputs";
/// Cursor-paginated input feed of an app.
pub const INPUTS_STREAM: &str = "inputs__stream";
/// Search/rank over an app's inputs.
pub const INPUTS_SEARCHES: &str = "inputs__searches";
/// Models collection of an app: list.
pub const MODELS: &str = "models";
/// Single model of an app: get.
pub const MODELS_ITEM: &str = "models__item";
/// Inference against a model's latest version.
pub const MODELS_PREDICT: &str = "models__predict";
/// Inference against a pinned model version.
pub const MODELS_PREDICT_VERSION: &str = "models__predict_version";
/// Public model search.
pub const MODELS_SEARCHES: &str = "models__searches";
/// Kick off training of a new model version.
pub const MODELS_TRAIN: &str = "models__train";
/// Historical usage feed of an account.
pub const USAGE_HISTORICAL: &str = "usage__historical";

/// Immutable name-to-template endpoint map.
///
/// Templates are path fragments relative to the client's base URL, with
/// `{placeholder}` variables filled per call from the resolved identity
/// and operation arguments.
#[derive(Debug, Clone)]
pub struct EndpointTable {
    entries: IndexMap<String, String>,
}

impl EndpointTable {
    /// The table shipped with the SDK, covering every built-in operation.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries([
            (APPS, "/v2/users/{user_id}/apps"),
            (APPS_ITEM, "/v2/users/{user_id}/apps/{app_id}"),
            (CONCEPTS, "/v2/users/{user_id}/apps/{app_id}/concepts"),
            (INPUTS, "/v2/users/{user_id}/apps/{app_id}/inputs"),
            (INPUTS_STREAM, "/v2/users/{user_id}/apps/{app_id}/inputs/stream"),
            (
                INPUTS_SEARCHES,
                "/v2/users/{user_id}/apps/{app_id}/inputs/searches",
            ),
            (MODELS, "/v2/users/{user_id}/apps/{app_id}/models"),
            (MODELS_ITEM, "/v2/users/{user_id}/apps/{app_id}/models/{model_id}"),
            (MODELS_PREDICT, "/v2/models/{model_id}/outputs"),
            (
                MODELS_PREDICT_VERSION,
                "/v2/models/{model_id}/versions/{version_id}/outputs",
            ),
            (MODELS_SEARCHES, "/v2/models/searches"),
            (
                MODELS_TRAIN,
                "/v2/users/{user_id}/apps/{app_id}/models/{model_id}/versions",
            ),
            (USAGE_HISTORICAL, "/v2/users/{user_id}/historical_usage"),
        ])
    }

    /// Build a table from arbitrary entries. Later duplicates of a name
    /// replace earlier ones.
    pub fn from_entries<N, T>(entries: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, template)| (name.into(), template.into()))
                .collect(),
        }
    }

    /// Look up the template for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownEndpoint`] for names not in the table.
    pub fn template(&self, name: &str) -> Result<&str, ClientError> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ClientError::UnknownEndpoint(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_named_endpoint() {
        let table = EndpointTable::builtin();
        for name in [
            APPS,
            APPS_ITEM,
            CONCEPTS,
            INPUTS,
            INPUTS_STREAM,
            INPUTS_SEARCHES,
            MODELS,
            MODELS_ITEM,
            MODELS_PREDICT,
            MODELS_PREDICT_VERSION,
            MODELS_SEARCHES,
            MODELS_TRAIN,
            USAGE_HISTORICAL,
        ] {
            assert!(table.template(name).is_ok(), "missing template for {name}");
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let table = EndpointTable::builtin();
        let err = table.template("workflows").unwrap_err();
        assert!(matches!(err, ClientError::UnknownEndpoint(name) if name == "workflows"));
    }

    #[test]
    fn custom_table_replaces_builtin_routing() {
        let table = EndpointTable::from_entries([(APPS, "/v3/accounts/{user_id}/apps")]);
        assert_eq!(table.template(APPS).unwrap(), "/v3/accounts/{user_id}/apps");
        assert!(table.template(APPS_ITEM).is_err());
    }
}
