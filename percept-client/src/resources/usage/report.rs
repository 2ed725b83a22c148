//! Regrouping of the flat historical usage feed.
//!
//! The platform reports usage as a flat list of records, one per
//! (date, app, category, model) combination. The report types fold that
//! list into nested maps keyed by date and/or app, with each leaf split
//! by operation category and, for model-related categories, by model.
//! Key order follows first appearance in the feed; the grand total of a
//! report always equals the sum of the records it was built from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Categories whose operations are attributable to a specific model.
pub const MODEL_RELATED_CATEGORIES: &[&str] = &["model-predict"];

/// One record of the historical usage feed.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub value: u64,
}

/// A nesting level of a regrouped report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Date,
    App,
}

/// Leaf of a report: operation counts of one group.
///
/// Field order keeps `total_ops` last in serialized output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageBreakdown {
    pub by_ops_category: IndexMap<String, u64>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub by_models: IndexMap<String, u64>,
    pub total_ops: u64,
}

impl UsageBreakdown {
    fn add(&mut self, record: &UsageRecord) {
        *self
            .by_ops_category
            .entry(record.category_id.clone())
            .or_default() += record.value;
        if MODEL_RELATED_CATEGORIES.contains(&record.category_id.as_str()) {
            let model = record
                .model_id
                .clone()
                .unwrap_or_else(|| "unknown".to_owned());
            *self.by_models.entry(model).or_default() += record.value;
        }
        self.total_ops += record.value;
    }
}

/// A regrouped usage report: nested groups ending in breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UsageReport {
    Groups(IndexMap<String, UsageReport>),
    Leaf(UsageBreakdown),
}

impl UsageReport {
    /// Sum of every leaf's `total_ops`.
    #[must_use]
    pub fn total_ops(&self) -> u64 {
        match self {
            UsageReport::Leaf(leaf) => leaf.total_ops,
            UsageReport::Groups(groups) => groups.values().map(UsageReport::total_ops).sum(),
        }
    }
}

/// Fold a flat feed into nested groups, one level per entry of `keys`.
/// An empty `keys` produces a single breakdown of the whole feed.
#[must_use]
pub fn regroup(records: &[UsageRecord], keys: &[GroupKey]) -> UsageReport {
    let refs: Vec<&UsageRecord> = records.iter().collect();
    regroup_refs(&refs, keys)
}

fn regroup_refs(records: &[&UsageRecord], keys: &[GroupKey]) -> UsageReport {
    match keys.split_first() {
        None => {
            let mut leaf = UsageBreakdown::default();
            for record in records {
                leaf.add(record);
            }
            UsageReport::Leaf(leaf)
        }
        Some((key, rest)) => {
            let mut groups: IndexMap<String, Vec<&UsageRecord>> = IndexMap::new();
            for record in records {
                let bucket = match key {
                    GroupKey::Date => record.date.clone().unwrap_or_default(),
                    GroupKey::App => record.app_id.clone().unwrap_or_default(),
                };
                groups.entry(bucket).or_default().push(record);
            }
            UsageReport::Groups(
                groups
                    .into_iter()
                    .map(|(bucket, members)| (bucket, regroup_refs(&members, rest)))
                    .collect(),
            )
        }
    }
}
