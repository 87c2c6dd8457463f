//! Configuration for the filter store and the field registry
//!
//! Settings can be built from a profile preset, deserialized from JSON, or
//! assembled by hand. Every field has a default so partial JSON documents are
//! accepted.

use crate::core::constants::{
    DEFAULT_FLUSH_DELAY_MS, DEFAULT_HISTORY_CAPACITY, FILTERS_KEY, PREFERENCES_KEY, PRESETS_KEY,
    SESSION_FILTERS_KEY, SNAPSHOTS_KEY, URL_FILTER_PARAM,
};
use crate::filters::PersistPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigProfile {
    /// Write every channel on every change
    Standard,
    /// Batch channel writes behind `flush`
    Batched,
    Custom(SoilHubConfig),
}

impl ConfigProfile {
    pub fn resolve(&self) -> SoilHubConfig {
        match self {
            Self::Standard => SoilHubConfig::default(),
            Self::Batched => SoilHubConfig {
                filters: FilterStoreConfig {
                    persist_policy: PersistPolicy::Deferred,
                    flush_delay_ms: 500,
                    ..FilterStoreConfig::default()
                },
                fields: FieldRegistryConfig::default(),
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for ConfigProfile {
    fn default() -> Self {
        Self::Standard
    }
}

/// Storage key names, one per persisted concern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub filters: String,
    pub snapshots: String,
    pub preferences: String,
    pub presets: String,
    pub session_filters: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            filters: FILTERS_KEY.to_string(),
            snapshots: SNAPSHOTS_KEY.to_string(),
            preferences: PREFERENCES_KEY.to_string(),
            presets: PRESETS_KEY.to_string(),
            session_filters: SESSION_FILTERS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterStoreConfig {
    /// Undo entries kept before the oldest is dropped
    pub max_history: usize,
    pub persist_policy: PersistPolicy,
    /// Quiet period before deferred changes are due for `flush_if_due`
    pub flush_delay_ms: u64,
    pub url_param: String,
    pub keys: StorageKeys,
}

impl Default for FilterStoreConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_CAPACITY,
            persist_policy: PersistPolicy::Immediate,
            flush_delay_ms: DEFAULT_FLUSH_DELAY_MS,
            url_param: URL_FILTER_PARAM.to_string(),
            keys: StorageKeys::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldRegistryConfig {
    /// Base URL of the fields service; no remote is built when unset
    pub api_base_url: Option<String>,
    /// Prefix for generated display names ("Field 1", "Field 2", ...)
    pub default_name_prefix: String,
    pub max_fields: Option<usize>,
}

impl Default for FieldRegistryConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            default_name_prefix: "Field".to_string(),
            max_fields: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilHubConfig {
    pub filters: FilterStoreConfig,
    pub fields: FieldRegistryConfig,
}

impl SoilHubConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
