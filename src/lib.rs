//! # soilhub
//!
//! Client-side state core for the CAAIN Soil Hub advisory platform.
//!
//! Two services make up the crate: a filter state store with undo/redo
//! history, named snapshots and multi-channel persistence, and a field
//! boundary registry that owns user-drawn farm fields, computes their
//! geodesic area and exchanges them with the fields service.

pub mod core;
pub mod data;
pub mod fields;
pub mod filters;
pub mod schedule;
pub mod storage;
pub mod traits;
pub mod prelude;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    area::FieldArea,
    builder::{Services, ServicesBuilder},
    config::{ConfigProfile, FieldRegistryConfig, FilterStoreConfig, SoilHubConfig},
    geo::{LatLng, LatLngBounds},
};

pub use filters::{
    validate_filters, FilterPreferences, FilterSet, FilterStateStore, FilterValue, FilterWarning,
    HistoryStack, ListenerId, PersistPolicy, Snapshot,
};

pub use fields::{
    Boundary, DrawEvent, DrawnShape, Field, FieldId, FieldRegistry, FieldRemote, HttpFieldRemote,
    ShapeId, ShapeKind, SyncState,
};

pub use data::geojson::{deserialize_boundary, serialize_boundary, BoundaryGeometry};

pub use storage::{FileStorage, MemoryStorage, QueryStringLocation};

pub use traits::{LocationChannel, StorageChannel};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum SoilHubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<csv::Error> for SoilHubError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Error type alias for convenience
pub type Error = SoilHubError;

/// Install `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
