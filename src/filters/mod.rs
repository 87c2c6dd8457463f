//! Crop filter state: values, sanitizing, undo history, snapshots and the
//! persisted store that ties them together.

pub mod history;
pub mod preferences;
pub mod snapshot;
pub mod store;
pub mod validate;
pub mod value;

// Re-export the essential types
pub use history::HistoryStack;
pub use preferences::FilterPreferences;
pub use snapshot::{Snapshot, SnapshotBook};
pub use store::{ChangeListener, FilterStateStore, ListenerId, PersistPolicy};
pub use validate::{
    sanitize_with_warnings, validate_filters, FilterWarning, GROWING_SEASON_RANGE, SOIL_PH_RANGE,
};
pub use value::{FilterSet, FilterValue, RangeValue};
