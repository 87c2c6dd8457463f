//! Services builder for fluent API configuration
//!
//! A page builds one [`Services`] bundle at startup and hands references to
//! the views that need them, instead of reaching for globals.

use crate::{
    core::config::{ConfigProfile, FieldRegistryConfig, FilterStoreConfig, SoilHubConfig},
    fields::{FieldId, FieldRegistry, FieldRemote, HttpFieldRemote},
    filters::{FilterStateStore, PersistPolicy},
    storage::{FileStorage, MemoryStorage, QueryStringLocation},
    traits::{LocationChannel, StorageChannel},
    Error, Result,
};
use std::path::PathBuf;

/// The filter store and field registry of one page, plus the remote the
/// registry saves to
pub struct Services {
    pub filters: FilterStateStore,
    pub fields: FieldRegistry,
    remote: Option<Box<dyn FieldRemote>>,
}

impl Services {
    pub fn builder() -> ServicesBuilder {
        ServicesBuilder::new()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn set_remote(&mut self, remote: impl FieldRemote + 'static) {
        self.remote = Some(Box::new(remote));
    }

    /// Save one field through the configured remote
    pub async fn save_field(&mut self, id: FieldId) -> Result<()> {
        let remote = configured(&self.remote)?;
        self.fields.save_field(id, remote).await
    }

    /// Save every unsynced field through the configured remote
    pub async fn save_unsynced(&mut self) -> Result<Vec<(FieldId, Result<()>)>> {
        let remote = configured(&self.remote)?;
        Ok(self.fields.save_unsynced(remote).await)
    }

    /// Load fields from the configured remote
    pub async fn load_fields(&mut self) -> Result<usize> {
        let remote = configured(&self.remote)?;
        self.fields.load_fields(remote).await
    }
}

fn configured(remote: &Option<Box<dyn FieldRemote>>) -> Result<&dyn FieldRemote> {
    remote
        .as_deref()
        .ok_or_else(|| Error::Storage("no fields service configured".to_string()))
}

/// Builder for creating and configuring [`Services`]
pub struct ServicesBuilder {
    profile: ConfigProfile,
    filter_config: Option<FilterStoreConfig>,
    field_config: Option<FieldRegistryConfig>,
    location: Option<Box<dyn LocationChannel>>,
    durable: Option<Box<dyn StorageChannel>>,
    session: Option<Box<dyn StorageChannel>>,
    remote: Option<Box<dyn FieldRemote>>,
}

impl ServicesBuilder {
    /// Create a new builder; every channel defaults to in-memory
    pub fn new() -> Self {
        Self {
            profile: ConfigProfile::default(),
            filter_config: None,
            field_config: None,
            location: None,
            durable: None,
            session: None,
            remote: None,
        }
    }

    pub fn with_profile(mut self, profile: ConfigProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_config(mut self, config: SoilHubConfig) -> Self {
        self.profile = ConfigProfile::Custom(config);
        self
    }

    /// Override the filter store part of the profile
    pub fn with_filter_config(mut self, config: FilterStoreConfig) -> Self {
        self.filter_config = Some(config);
        self
    }

    /// Override the field registry part of the profile
    pub fn with_field_config(mut self, config: FieldRegistryConfig) -> Self {
        self.field_config = Some(config);
        self
    }

    pub fn with_persist_policy(mut self, policy: PersistPolicy) -> Self {
        let mut config = self
            .filter_config
            .take()
            .unwrap_or_else(|| self.profile.resolve().filters);
        config.persist_policy = policy;
        self.filter_config = Some(config);
        self
    }

    pub fn with_location(mut self, location: impl LocationChannel + 'static) -> Self {
        self.location = Some(Box::new(location));
        self
    }

    pub fn with_durable_storage(mut self, storage: impl StorageChannel + 'static) -> Self {
        self.durable = Some(Box::new(storage));
        self
    }

    pub fn with_session_storage(mut self, storage: impl StorageChannel + 'static) -> Self {
        self.session = Some(Box::new(storage));
        self
    }

    /// Keep durable state as JSON files under `root`. Session state stays in
    /// memory.
    pub fn with_state_dir(self, root: impl Into<PathBuf>) -> Self {
        self.with_durable_storage(FileStorage::new(root))
    }

    pub fn with_remote(mut self, remote: impl FieldRemote + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    /// `localStorage`, `sessionStorage` and the page location
    #[cfg(feature = "wasm")]
    pub fn with_browser_channels(self) -> Result<Self> {
        use crate::storage::{BrowserLocation, WebStorage};
        Ok(self
            .with_location(BrowserLocation::new()?)
            .with_durable_storage(WebStorage::local()?)
            .with_session_storage(WebStorage::session()?))
    }

    /// Build the services with the configured options
    pub fn build(self) -> Result<Services> {
        let resolved = self.profile.resolve();
        let filter_config = self.filter_config.unwrap_or(resolved.filters);
        let field_config = self.field_config.unwrap_or(resolved.fields);

        let remote = match (self.remote, &field_config.api_base_url) {
            (Some(remote), _) => Some(remote),
            (None, Some(base_url)) => {
                Some(Box::new(HttpFieldRemote::new(base_url)?) as Box<dyn FieldRemote>)
            }
            (None, None) => None,
        };

        let filters = FilterStateStore::open(
            filter_config,
            self.location
                .unwrap_or_else(|| Box::new(QueryStringLocation::default())),
            self.durable
                .unwrap_or_else(|| Box::new(MemoryStorage::new("local"))),
            self.session
                .unwrap_or_else(|| Box::new(MemoryStorage::new("session"))),
        );
        log::debug!(
            "services ready: {} filters restored, remote {}",
            filters.current().len(),
            if remote.is_some() { "configured" } else { "absent" }
        );

        Ok(Services {
            filters,
            fields: FieldRegistry::new(field_config),
            remote,
        })
    }
}

impl Default for ServicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterValue;

    #[test]
    fn test_defaults_to_memory_channels() {
        let services = ServicesBuilder::new().build().unwrap();
        assert!(services.filters.current().is_empty());
        assert!(services.fields.is_empty());
        assert!(!services.has_remote());
        assert_eq!(
            services.filters.config().persist_policy,
            PersistPolicy::Immediate
        );
    }

    #[test]
    fn test_profile_and_overrides() {
        let services = ServicesBuilder::new()
            .with_profile(ConfigProfile::Batched)
            .build()
            .unwrap();
        assert_eq!(services.filters.config().persist_policy, PersistPolicy::Deferred);

        let services = ServicesBuilder::new()
            .with_profile(ConfigProfile::Batched)
            .with_persist_policy(PersistPolicy::Immediate)
            .build()
            .unwrap();
        assert_eq!(services.filters.config().persist_policy, PersistPolicy::Immediate);
        assert_eq!(services.filters.config().flush_delay_ms, 500);
    }

    #[test]
    fn test_api_base_url_builds_http_remote() {
        let services = ServicesBuilder::new()
            .with_field_config(FieldRegistryConfig {
                api_base_url: Some("http://localhost:8000".to_string()),
                ..FieldRegistryConfig::default()
            })
            .build()
            .unwrap();
        assert!(services.has_remote());

        let bad = ServicesBuilder::new()
            .with_field_config(FieldRegistryConfig {
                api_base_url: Some("::".to_string()),
                ..FieldRegistryConfig::default()
            })
            .build();
        assert!(bad.is_err());
    }

    #[test]
    fn test_shared_channels_restore_state() {
        let durable = MemoryStorage::new("local");
        {
            let mut services = ServicesBuilder::new()
                .with_durable_storage(durable.clone())
                .build()
                .unwrap();
            services
                .filters
                .set_filter("crop_types", FilterValue::categories(["canola"]));
        }

        let services = ServicesBuilder::new()
            .with_durable_storage(durable)
            .build()
            .unwrap();
        assert_eq!(
            services.filters.get_filter("crop_types"),
            Some(&FilterValue::categories(["canola"]))
        );
    }
}
