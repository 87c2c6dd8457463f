//! Prelude module for common soilhub types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use soilhub::prelude::*;`

pub use crate::core::{
    area::FieldArea,
    builder::{Services, ServicesBuilder},
    config::{ConfigProfile, FieldRegistryConfig, FilterStoreConfig, SoilHubConfig},
    geo::{LatLng, LatLngBounds},
};

pub use crate::filters::{
    validate_filters, FilterPreferences, FilterSet, FilterStateStore, FilterValue, FilterWarning,
    HistoryStack, ListenerId, PersistPolicy, RangeValue, Snapshot,
};

pub use crate::fields::{
    Boundary, DrawEvent, DrawnShape, Field, FieldId, FieldRegistry, FieldRemote, HttpFieldRemote,
    ShapeId, ShapeKind, SyncState,
};

pub use crate::storage::{FileStorage, MemoryStorage, QueryStringLocation};

pub use crate::traits::{LocationChannel, StorageChannel};

pub use crate::schedule::Throttle;

#[cfg(feature = "tokio-runtime")]
pub use crate::schedule::Debouncer;

pub use crate::{Error as SoilHubError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
