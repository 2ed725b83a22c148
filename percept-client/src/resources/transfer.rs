//! Cross-account input transfer.
//!
//! Streams every input of an origin app and re-uploads it into a
//! destination app, page by page, without ever holding more than one page
//! in memory. Server-managed fields are stripped along the way: ids are
//! dropped (the destination assigns fresh ones) and hosted media
//! references are rewritten into fetchable URLs.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};

use crate::auth::{AuthOverride, Credentials};
use crate::client::ClientInner;
use crate::error::ClientError;
use crate::pager::{self, StepOutcome};
use crate::response::{ResponseWrapper, Status};

use super::inputs::Inputs;
use super::{item_id, page_outcome};

/// Page size of the transfer walk, matching the platform's write batch
/// limit so every streamed page can be uploaded in one call.
pub(crate) const TRANSFER_PAGE_SIZE: u32 = 128;

/// What to carry over besides the media itself.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub keep_concepts: bool,
    pub keep_metadata: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            keep_concepts: true,
            keep_metadata: true,
        }
    }
}

/// Bulk data movement between accounts.
pub struct Transfer<'a> {
    inner: &'a ClientInner,
}

impl<'a> Transfer<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    /// Move every input of the origin app into the destination app.
    ///
    /// Pages are streamed under the origin identity, reshaped, and
    /// uploaded under the destination identity before the next page is
    /// fetched. The result reports how many inputs were uploaded; a
    /// platform failure on either side stops the walk and reports the
    /// progress made under the failing status. Inputs without a usable
    /// media URL are skipped.
    pub async fn inputs_all(
        &self,
        origin: &Credentials,
        destination: &Credentials,
        options: &TransferOptions,
    ) -> Result<ResponseWrapper, ClientError> {
        let origin_inputs = Inputs::new(self.inner).with_auth(AuthOverride::from(origin));
        let destination_inputs = Inputs::new(self.inner).with_auth(AuthOverride::from(destination));
        let transferred = AtomicU64::new(0);

        let drained = pager::drain_stream_each(
            TRANSFER_PAGE_SIZE,
            |last_id| {
                let origin_inputs = &origin_inputs;
                async move {
                    let wrapper = origin_inputs
                        .stream(Some(TRANSFER_PAGE_SIZE), last_id.as_deref())
                        .await?;
                    Ok(page_outcome(wrapper, "inputs"))
                }
            },
            item_id,
            |batch: Vec<Value>| {
                let destination_inputs = &destination_inputs;
                let transferred = &transferred;
                async move {
                    let reshaped: Vec<Value> = batch
                        .iter()
                        .filter_map(|input| reshape_input(input, options))
                        .collect();
                    if reshaped.is_empty() {
                        return Ok(StepOutcome::Done);
                    }
                    let wrapper = destination_inputs.add(&reshaped).await?;
                    if wrapper.is_success() {
                        transferred.fetch_add(reshaped.len() as u64, Ordering::Relaxed);
                        Ok(StepOutcome::Done)
                    } else {
                        Ok(StepOutcome::Failed(wrapper.status().clone()))
                    }
                }
            },
        )
        .await?;

        let pretty = self.inner.executor.pretty();
        let count = transferred.load(Ordering::Relaxed);
        Ok(match drained {
            pager::DrainedCount::Complete { pages, .. } => ResponseWrapper::synthesized(
                Status::success(),
                json!({"transferred_inputs_count": count, "pages": pages}),
                pretty,
            ),
            pager::DrainedCount::Aborted { status, .. } => ResponseWrapper::synthesized(
                status,
                json!({"transferred_inputs_count": count}),
                pretty,
            ),
        })
    }
}

/// Reduce a fetched input to the `data` object of an add call: media URL
/// plus optionally concepts (trimmed to id and value) and metadata.
/// Returns `None` for inputs without a resolvable media URL.
fn reshape_input(input: &Value, options: &TransferOptions) -> Option<Value> {
    let data = input.get("data")?;
    let (kind, media) = ["image", "video"]
        .iter()
        .find_map(|k| data.get(*k).map(|media| (*k, media)))?;
    let url = hosted_url(media)
        .or_else(|| media.get("url").and_then(Value::as_str).map(str::to_owned))?;

    let mut out = serde_json::Map::new();
    out.insert(kind.to_owned(), json!({"url": url}));
    if options.keep_concepts {
        if let Some(concepts) = data.get("concepts").and_then(Value::as_array) {
            let kept: Vec<Value> = concepts
                .iter()
                .map(|concept| {
                    json!({
                        "id": concept.get("id").cloned().unwrap_or(Value::Null),
                        "value": concept.get("value").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect();
            out.insert("concepts".to_owned(), Value::Array(kept));
        }
    }
    if options.keep_metadata {
        if let Some(metadata) = data.get("metadata") {
            out.insert("metadata".to_owned(), metadata.clone());
        }
    }
    Some(Value::Object(out))
}

/// Platform-hosted media carries a `hosted` object instead of a stable
/// `url`; the fetchable form is `{prefix}/large/{suffix}`.
fn hosted_url(media: &Value) -> Option<String> {
    let hosted = media.get("hosted")?;
    let prefix = hosted.get("prefix")?.as_str()?;
    let suffix = hosted.get("suffix")?.as_str()?;
    Some(format!("{prefix}/large/{suffix}"))
}
