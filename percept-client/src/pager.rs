//! Exhaustive pagination drivers.
//!
//! Aggregating operations walk pages strictly sequentially until the
//! collection is drained or the platform reports a failure. Two cursor
//! shapes exist: offset (`page`/`per_page`, pages numbered from 1) and
//! stream (`last_id`/`per_page`). Both terminate on the first batch
//! shorter than `per_page`; an empty batch is a valid last page.
//!
//! A failing platform status aborts the walk immediately. What was
//! gathered before the failure is preserved alongside the status, so the
//! caller can report partial progress.

use std::future::Future;

use crate::error::ClientError;
use crate::response::Status;

/// What one page fetch produced.
pub(crate) enum PageOutcome<T> {
    Items(Vec<T>),
    Failed(Status),
}

/// Final result of an accumulating walk.
#[derive(Debug)]
pub(crate) enum Drained<T> {
    Complete { items: Vec<T>, pages: u32 },
    Aborted { status: Status, partial: Vec<T> },
}

/// Final result of a walk whose pages are consumed by an effect.
pub(crate) enum DrainedCount {
    Complete { count: u64, pages: u32 },
    Aborted { status: Status, partial: u64 },
}

/// Outcome of a per-page effect.
pub(crate) enum StepOutcome {
    Done,
    Failed(Status),
}

/// Drive offset pagination to exhaustion, accumulating items.
///
/// `fetch` is called with page numbers 1, 2, ... until it returns a batch
/// shorter than `per_page`.
pub(crate) async fn drain_offset<T, F, Fut>(
    per_page: u32,
    mut fetch: F,
) -> Result<Drained<T>, ClientError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PageOutcome<T>, ClientError>>,
{
    let mut items = Vec::new();
    let mut page = 1u32;
    loop {
        match fetch(page).await? {
            PageOutcome::Failed(status) => {
                tracing::warn!(code = status.code, page, "pagination aborted by platform status");
                return Ok(Drained::Aborted {
                    status,
                    partial: items,
                });
            }
            PageOutcome::Items(batch) => {
                let short = batch.len() < per_page as usize;
                items.extend(batch);
                if short {
                    return Ok(Drained::Complete { items, pages: page });
                }
                page += 1;
            }
        }
    }
}

/// Drive stream (cursor) pagination to exhaustion, accumulating items.
///
/// `fetch` receives the id of the last item of the previous batch, or
/// `None` on the first call. `last_id_of` extracts an item's id; an item
/// without one would stall the cursor, so it is a malformed envelope.
pub(crate) async fn drain_stream<T, F, Fut, I>(
    per_page: u32,
    mut fetch: F,
    mut last_id_of: I,
) -> Result<Drained<T>, ClientError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PageOutcome<T>, ClientError>>,
    I: FnMut(&T) -> Option<String>,
{
    let mut items = Vec::new();
    let mut last_id: Option<String> = None;
    let mut pages = 0u32;
    loop {
        match fetch(last_id.take()).await? {
            PageOutcome::Failed(status) => {
                tracing::warn!(code = status.code, pages, "pagination aborted by platform status");
                return Ok(Drained::Aborted {
                    status,
                    partial: items,
                });
            }
            PageOutcome::Items(batch) => {
                pages += 1;
                let short = batch.len() < per_page as usize;
                if !short {
                    last_id = Some(cursor_of(&batch, &mut last_id_of)?);
                }
                items.extend(batch);
                if short {
                    return Ok(Drained::Complete { items, pages });
                }
            }
        }
    }
}

/// Drive stream pagination, handing each non-empty batch to `on_page`
/// instead of accumulating. A failing effect aborts the walk exactly like
/// a failing fetch; the aborted page's items are not counted.
pub(crate) async fn drain_stream_each<T, F, Fut, I, G, Gut>(
    per_page: u32,
    mut fetch: F,
    mut last_id_of: I,
    mut on_page: G,
) -> Result<DrainedCount, ClientError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PageOutcome<T>, ClientError>>,
    I: FnMut(&T) -> Option<String>,
    G: FnMut(Vec<T>) -> Gut,
    Gut: Future<Output = Result<StepOutcome, ClientError>>,
{
    let mut count = 0u64;
    let mut last_id: Option<String> = None;
    let mut pages = 0u32;
    loop {
        match fetch(last_id.take()).await? {
            PageOutcome::Failed(status) => {
                tracing::warn!(code = status.code, pages, "pagination aborted by platform status");
                return Ok(DrainedCount::Aborted {
                    status,
                    partial: count,
                });
            }
            PageOutcome::Items(batch) => {
                pages += 1;
                let batch_len = batch.len();
                let short = batch_len < per_page as usize;
                if batch_len > 0 {
                    if !short {
                        last_id = Some(cursor_of(&batch, &mut last_id_of)?);
                    }
                    match on_page(batch).await? {
                        StepOutcome::Done => count += batch_len as u64,
                        StepOutcome::Failed(status) => {
                            tracing::warn!(code = status.code, pages, "page effect failed");
                            return Ok(DrainedCount::Aborted {
                                status,
                                partial: count,
                            });
                        }
                    }
                }
                if short {
                    return Ok(DrainedCount::Complete { count, pages });
                }
            }
        }
    }
}

fn cursor_of<T, I>(batch: &[T], last_id_of: &mut I) -> Result<String, ClientError>
where
    I: FnMut(&T) -> Option<String>,
{
    batch
        .last()
        .and_then(|item| last_id_of(item))
        .ok_or_else(|| ClientError::MalformedEnvelope("paged item without an id".to_owned()))
}
