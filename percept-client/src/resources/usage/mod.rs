//! Historical usage reporting.
//!
//! The raw feed is one flat record list per timeframe; the high-level
//! operations fetch it and regroup it client-side (see [`report`]) into
//! per-date and per-app views. Regrouped results are synthesized
//! responses: the feed's status is preserved, the payload is built here.

pub mod report;

use chrono::{DateTime, Duration, Months, Utc};
use percept_http::Method;
use serde_json::{Value, json};

use crate::auth::{AuthOverride, ResolvedAuth};
use crate::client::ClientInner;
use crate::endpoints;
use crate::error::ClientError;
use crate::response::ResponseWrapper;
use crate::urls::QueryValue;

pub use report::{GroupKey, UsageBreakdown, UsageRecord, UsageReport};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Relative timeframes the platform is commonly queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageWindow {
    LastDay,
    LastWeek,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
}

/// The timeframe of a usage query, as the formatted bounds the API takes.
#[derive(Debug, Clone)]
pub struct UsageRange {
    start_date: String,
    end_date: String,
}

impl UsageRange {
    /// A window ending now.
    #[must_use]
    pub fn window(window: UsageWindow) -> Self {
        let now = Utc::now();
        let start = match window {
            UsageWindow::LastDay => now - Duration::days(1),
            UsageWindow::LastWeek => now - Duration::weeks(1),
            UsageWindow::LastMonth => sub_months(now, 1),
            UsageWindow::LastThreeMonths => sub_months(now, 3),
            UsageWindow::LastSixMonths => sub_months(now, 6),
        };
        Self {
            start_date: start.format(DATE_FORMAT).to_string(),
            end_date: now.format(DATE_FORMAT).to_string(),
        }
    }

    /// Explicit bounds, passed to the API verbatim.
    pub fn between(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    #[must_use]
    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    fn timeframe_value(&self) -> Value {
        json!({"start_date": self.start_date, "end_date": self.end_date})
    }
}

impl Default for UsageRange {
    fn default() -> Self {
        Self::window(UsageWindow::LastMonth)
    }
}

fn sub_months(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

/// Usage reporting of an account.
pub struct Usage<'a> {
    inner: &'a ClientInner,
    auth: Option<AuthOverride>,
}

impl<'a> Usage<'a> {
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

    /// Fetch the raw usage feed for a timeframe. With `per_app` the
    /// platform attributes each record to its app.
    pub async fn historical_feed(
        &self,
        range: &UsageRange,
        per_app: bool,
    ) -> Result<ResponseWrapper, ClientError> {
        let auth = self.resolve();
        self.inner
            .executor
            .execute(
                endpoints::USAGE_HISTORICAL,
                Method::Get,
                &auth,
                &[("user_id", Some(auth.user_id()))],
                &[
                    ("start_date", Some(QueryValue::from(range.start_date()))),
                    ("end_date", Some(QueryValue::from(range.end_date()))),
                    (
                        "broken_down_per_app",
                        per_app.then_some(QueryValue::from(true)),
                    ),
                ],
                None,
            )
            .await
    }

    /// Account usage over a timeframe, split by operation category.
    pub async fn historical(&self, range: &UsageRange) -> Result<ResponseWrapper, ClientError> {
        self.regrouped(range, false, &[], "usage").await
    }

    /// Account usage grouped per app.
    pub async fn historical_per_apps(
        &self,
        range: &UsageRange,
    ) -> Result<ResponseWrapper, ClientError> {
        self.regrouped(range, true, &[GroupKey::App], "usage_per_apps")
            .await
    }

    /// Account usage grouped per day.
    pub async fn historical_by_date(
        &self,
        range: &UsageRange,
    ) -> Result<ResponseWrapper, ClientError> {
        self.regrouped(range, false, &[GroupKey::Date], "usage_by_date")
            .await
    }

    /// Account usage grouped per day, then per app.
    pub async fn historical_by_date_and_apps(
        &self,
        range: &UsageRange,
    ) -> Result<ResponseWrapper, ClientError> {
        self.regrouped(
            range,
            true,
            &[GroupKey::Date, GroupKey::App],
            "usage_by_date_and_apps",
        )
        .await
    }

    /// Just the total number of operations over a timeframe.
    pub async fn total_ops(&self, range: &UsageRange) -> Result<ResponseWrapper, ClientError> {
        let pretty = self.inner.executor.pretty();
        let (status, records) = match self.fetch_records(range, false).await? {
            Ok(records) => (crate::response::Status::success(), records),
            Err(status) => {
                return Ok(ResponseWrapper::synthesized(status, json!({}), pretty));
            }
        };
        let report = report::regroup(&records, &[]);
        Ok(ResponseWrapper::synthesized(
            status,
            json!({
                "total_ops": report.total_ops(),
                "timeframe": range.timeframe_value(),
            }),
            pretty,
        ))
    }

    async fn regrouped(
        &self,
        range: &UsageRange,
        per_app: bool,
        keys: &[GroupKey],
        payload_key: &str,
    ) -> Result<ResponseWrapper, ClientError> {
        let pretty = self.inner.executor.pretty();
        let records = match self.fetch_records(range, per_app).await? {
            Ok(records) => records,
            Err(status) => {
                return Ok(ResponseWrapper::synthesized(status, json!({}), pretty));
            }
        };
        let report = report::regroup(&records, keys);

        let mut payload = serde_json::Map::new();
        // Serializing string-keyed maps cannot fail.
        payload.insert(
            payload_key.to_owned(),
            serde_json::to_value(&report).unwrap_or_default(),
        );
        payload.insert("timeframe".to_owned(), range.timeframe_value());
        Ok(ResponseWrapper::synthesized(
            crate::response::Status::success(),
            Value::Object(payload),
            pretty,
        ))
    }

    /// Fetch and parse the feed; a failing feed status comes back in the
    /// `Err` arm of the inner result.
    async fn fetch_records(
        &self,
        range: &UsageRange,
        per_app: bool,
    ) -> Result<Result<Vec<UsageRecord>, crate::response::Status>, ClientError> {
        let feed = self.historical_feed(range, per_app).await?;
        if !feed.is_success() {
            return Ok(Err(feed.status().clone()));
        }
        let raw = feed
            .data()
            .get("usage")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let records: Vec<UsageRecord> = serde_json::from_value(raw)
            .map_err(|e| ClientError::MalformedEnvelope(format!("unparseable usage feed: {e}")))?;
        Ok(Ok(records))
    }
}
