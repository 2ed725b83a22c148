//! Resource families exposed by the client.
//!
//! Each family borrows the client internals and optionally carries a
//! per-call identity override (`with_auth`). Operation methods resolve the
//! effective identity once, validate arguments before the network, and
//! return [`crate::ResponseWrapper`]s.

pub mod apps;
pub mod concepts;
pub mod inputs;
pub mod models;
pub mod transfer;
pub mod usage;

pub use apps::Apps;
pub use concepts::Concepts;
pub use inputs::{ConceptFilter, Inputs, MAX_WRITE_BATCH};
pub use models::{Models, PredictInput};
pub use transfer::{Transfer, TransferOptions};
pub use usage::{Usage, UsageRange, UsageWindow};

use serde_json::Value;

use crate::pager::{Drained, PageOutcome};
use crate::response::{ResponseWrapper, Status};

/// Page size used by exhaustive `list_all` walks.
pub(crate) const LIST_ALL_PAGE_SIZE: u32 = 100;

/// Interpret a single-page response for a pagination driver: a failing
/// status aborts the walk, otherwise the named array is the batch. A
/// successful page without the key counts as empty.
pub(crate) fn page_outcome(wrapper: ResponseWrapper, key: &str) -> PageOutcome<Value> {
    if !wrapper.is_success() {
        return PageOutcome::Failed(wrapper.status().clone());
    }
    let items = wrapper
        .data()
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    PageOutcome::Items(items)
}

/// Synthesize the combined response of an accumulating walk. An aborted
/// walk keeps the failing status and attaches what was gathered.
pub(crate) fn drained_response(drained: Drained<Value>, key: &str, pretty: bool) -> ResponseWrapper {
    let (status, items) = match drained {
        Drained::Complete { items, .. } => (Status::success(), items),
        Drained::Aborted { status, partial } => (status, partial),
    };
    let count = items.len();
    let mut payload = serde_json::Map::new();
    payload.insert(key.to_owned(), Value::Array(items));
    payload.insert(format!("{key}_count"), Value::from(count));
    ResponseWrapper::synthesized(status, Value::Object(payload), pretty)
}

/// Extract an item's `id` for cursor threading.
pub(crate) fn item_id(item: &Value) -> Option<String> {
    item.get("id").and_then(Value::as_str).map(str::to_owned)
}

/// The `pagination` object of a search body, or `None` when neither knob
/// is set.
pub(crate) fn pagination_value(page: Option<u32>, per_page: Option<u32>) -> Option<Value> {
    if page.is_none() && per_page.is_none() {
        return None;
    }
    let mut pagination = serde_json::Map::new();
    if let Some(page) = page {
        pagination.insert("page".to_owned(), Value::from(page));
    }
    if let Some(per_page) = per_page {
        pagination.insert("per_page".to_owned(), Value::from(per_page));
    }
    Some(Value::Object(pagination))
}
