//! Core constants shared by the filter store and the field registry.
//! Storage keys mirror the names the web client has always used, so state
//! written by older builds is picked up unchanged.

/// URL query parameter carrying the JSON-encoded filter set.
pub const URL_FILTER_PARAM: &str = "filters";

/// Durable storage key for the active filter set.
pub const FILTERS_KEY: &str = "cropFilters";

/// Durable storage key for labeled snapshots.
pub const SNAPSHOTS_KEY: &str = "cropFilterSnapshots";

/// Durable storage key for user preferences.
pub const PREFERENCES_KEY: &str = "cropFilterPreferences";

/// Durable storage key for presets (label → filter set).
pub const PRESETS_KEY: &str = "cropFilterPresets";

/// Session-scoped storage key for the most recent filter set.
pub const SESSION_FILTERS_KEY: &str = "cropFiltersSession";

/// Default number of undo entries kept before the oldest is dropped.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default delay used by hosts that debounce deferred persistence.
pub const DEFAULT_FLUSH_DELAY_MS: u64 = 300;

/// Square meters → acres.
pub const ACRES_PER_SQUARE_METER: f64 = 0.000247105;

/// Square meters → hectares.
pub const HECTARES_PER_SQUARE_METER: f64 = 0.0001;

/// Fields REST collection path, relative to the API base URL.
pub const FIELDS_ENDPOINT: &str = "api/v1/fields";
