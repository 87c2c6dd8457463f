use super::value::FilterSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, user-labeled copy of a filter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub label: String,
    pub filters: FilterSet,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Session that created the snapshot
    #[serde(default)]
    pub session_id: String,
}

/// Snapshots keyed by label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotBook(BTreeMap<String, Snapshot>);

impl SnapshotBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save under `label`, silently replacing an existing snapshot
    pub fn save(
        &mut self,
        label: &str,
        filters: &FilterSet,
        description: &str,
        session_id: &str,
    ) -> Option<Snapshot> {
        let snapshot = Snapshot {
            label: label.to_string(),
            filters: filters.clone(),
            description: description.to_string(),
            created_at: Utc::now(),
            session_id: session_id.to_string(),
        };
        self.0.insert(label.to_string(), snapshot)
    }

    pub fn get(&self, label: &str) -> Option<&Snapshot> {
        self.0.get(label)
    }

    pub fn remove(&mut self, label: &str) -> Option<Snapshot> {
        self.0.remove(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
