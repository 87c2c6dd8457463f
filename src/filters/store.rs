use super::history::HistoryStack;
use super::preferences::FilterPreferences;
use super::snapshot::SnapshotBook;
use super::validate::{sanitize_with_warnings, FilterWarning};
use super::value::{FilterSet, FilterValue};
use crate::core::config::FilterStoreConfig;
use crate::data::export::{filters_to_csv, ConfigurationEnvelope};
use crate::storage::{MemoryStorage, QueryStringLocation};
use crate::traits::{LocationChannel, StorageChannel};
use crate::Result;
use instant::{Duration, Instant};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;

/// Callback run after every change to the active filters
pub type ChangeListener = Box<dyn FnMut(&FilterSet) -> Result<()>>;

/// Handle returned by [`FilterStateStore::add_change_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// When filter changes reach the persistence channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistPolicy {
    /// Rewrite every channel on every change
    #[default]
    Immediate,
    /// Mark dirty and write once on [`FilterStateStore::flush`], or once
    /// `flush_delay_ms` has passed without further changes
    Deferred,
}

fn read_json(channel: &dyn StorageChannel, key: &str) -> Option<serde_json::Value> {
    match channel.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring corrupt {} entry {}: {}", channel.name(), key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("{} read of {} failed: {}", channel.name(), key, e);
            None
        }
    }
}

fn read_typed<T: DeserializeOwned>(channel: &dyn StorageChannel, key: &str) -> Option<T> {
    let value = read_json(channel, key)?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(e) => {
            log::warn!("ignoring malformed {} entry {}: {}", channel.name(), key, e);
            None
        }
    }
}

fn write_json<T: Serialize>(channel: &mut dyn StorageChannel, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("could not encode {}: {}", key, e);
            return;
        }
    };
    match channel.write(key, &json) {
        Ok(()) => log::debug!("wrote {} ({} bytes) to {}", key, json.len(), channel.name()),
        Err(e) => log::warn!("{} write of {} failed: {}", channel.name(), key, e),
    }
}

/// Single source of truth for the active crop filters.
///
/// Owns the filter set, its undo/redo history, labeled snapshots, presets and
/// preferences, and mirrors the filter set into three channels: the page URL,
/// durable storage and session storage. Channel failures are logged and
/// otherwise ignored; the in-memory state stays authoritative.
pub struct FilterStateStore {
    config: FilterStoreConfig,
    filters: FilterSet,
    history: HistoryStack,
    snapshots: SnapshotBook,
    presets: BTreeMap<String, FilterSet>,
    preferences: FilterPreferences,
    session_id: String,
    location: Box<dyn LocationChannel>,
    durable: Box<dyn StorageChannel>,
    session: Box<dyn StorageChannel>,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener: u64,
    dirty: bool,
    last_change: Option<Instant>,
}

impl FilterStateStore {
    /// Create a store and restore its state from the channels.
    ///
    /// Filters come from the URL when present, else from durable storage,
    /// else from session storage.
    pub fn open(
        config: FilterStoreConfig,
        location: Box<dyn LocationChannel>,
        durable: Box<dyn StorageChannel>,
        session: Box<dyn StorageChannel>,
    ) -> Self {
        let mut store = Self {
            history: HistoryStack::with_capacity(config.max_history),
            config,
            filters: FilterSet::new(),
            snapshots: SnapshotBook::new(),
            presets: BTreeMap::new(),
            preferences: FilterPreferences::default(),
            session_id: uuid::Uuid::new_v4().to_string(),
            location,
            durable,
            session,
            listeners: Vec::new(),
            next_listener: 0,
            dirty: false,
            last_change: None,
        };
        store.restore();
        store
    }

    /// Store backed by fresh in-memory channels
    pub fn in_memory() -> Self {
        Self::open(
            FilterStoreConfig::default(),
            Box::new(QueryStringLocation::default()),
            Box::new(MemoryStorage::new("local")),
            Box::new(MemoryStorage::new("session")),
        )
    }

    fn restore(&mut self) {
        let keys = &self.config.keys;
        let durable = &*self.durable;

        self.preferences = read_typed(durable, &keys.preferences).unwrap_or_default();
        self.snapshots = read_typed(durable, &keys.snapshots).unwrap_or_default();
        self.presets = read_typed::<BTreeMap<String, FilterSet>>(durable, &keys.presets)
            .unwrap_or_default()
            .into_iter()
            .map(|(label, filters)| (label, filters.sanitized()))
            .collect();

        let from_url = match self.location.query_param(&self.config.url_param) {
            Ok(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => Some(("url", value)),
                Err(e) => {
                    log::warn!("ignoring corrupt filters in URL: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("URL read failed: {}", e);
                None
            }
        };

        let restored = from_url
            .or_else(|| read_json(durable, &keys.filters).map(|value| ("durable", value)))
            .or_else(|| {
                read_json(&*self.session, &keys.session_filters)
                    .map(|value| ("session", value))
            });

        if let Some((source, value)) = restored {
            let (filters, warnings) = sanitize_with_warnings(&value);
            log::debug!(
                "restored {} filters from {} storage ({} corrected)",
                filters.len(),
                source,
                warnings.len()
            );
            self.filters = filters;
        }
    }

    /// Active filters
    pub fn current(&self) -> &FilterSet {
        &self.filters
    }

    pub fn get_filter(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }

    /// Set one filter. The result is sanitized, persisted and broadcast.
    pub fn set_filter(&mut self, key: impl Into<String>, value: FilterValue) {
        self.filters.insert(key, value);
        self.filters.sanitize_in_place();
        self.commit();
    }

    /// Remove one filter; returns whether it was set
    pub fn remove_filter(&mut self, key: &str) -> bool {
        if self.filters.remove(key).is_none() {
            return false;
        }
        self.commit();
        true
    }

    /// Replace the whole filter set
    pub fn replace_filters(&mut self, filters: FilterSet) {
        self.filters = filters.sanitized();
        self.commit();
    }

    /// Replace the whole filter set from untrusted JSON (form state, imports).
    /// Returns what the sanitizer corrected.
    pub fn apply_json(&mut self, value: &serde_json::Value) -> Vec<FilterWarning> {
        let (filters, warnings) = sanitize_with_warnings(value);
        self.filters = filters;
        self.commit();
        warnings
    }

    /// Clear every filter
    pub fn reset(&mut self) {
        self.filters.clear();
        self.commit();
    }

    /// Record the current filters as an undo step. Returns false when the
    /// entry under the history cursor already matches.
    pub fn add_to_history(&mut self) -> bool {
        self.history.push(&self.filters)
    }

    pub fn undo(&mut self) -> bool {
        let Some(restored) = self.history.undo().cloned() else {
            return false;
        };
        self.filters = restored;
        self.commit();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(restored) = self.history.redo().cloned() else {
            return false;
        };
        self.filters = restored;
        self.commit();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Save the active filters under `label`, replacing any snapshot with
    /// that label. Written to durable storage right away.
    pub fn save_filter_snapshot(&mut self, label: &str, description: &str) {
        self.snapshots.save(label, &self.filters, description, &self.session_id);
        self.write_snapshots();
    }

    /// Restore a snapshot; returns whether the label existed
    pub fn load_filter_snapshot(&mut self, label: &str) -> bool {
        let Some(snapshot) = self.snapshots.get(label) else {
            return false;
        };
        self.filters = snapshot.filters.clone().sanitized();
        self.commit();
        true
    }

    /// Delete a snapshot; returns whether the label existed
    pub fn delete_filter_snapshot(&mut self, label: &str) -> bool {
        if self.snapshots.remove(label).is_none() {
            return false;
        }
        self.write_snapshots();
        true
    }

    pub fn snapshots(&self) -> &SnapshotBook {
        &self.snapshots
    }

    /// Save the active filters as a preset
    pub fn save_preset(&mut self, label: &str) {
        self.presets.insert(label.to_string(), self.filters.clone());
        self.write_presets();
    }

    /// Replace the active filters with a preset; returns whether it existed
    pub fn apply_preset(&mut self, label: &str) -> bool {
        let Some(preset) = self.presets.get(label) else {
            return false;
        };
        self.filters = preset.clone().sanitized();
        self.commit();
        true
    }

    pub fn delete_preset(&mut self, label: &str) -> bool {
        if self.presets.remove(label).is_none() {
            return false;
        }
        self.write_presets();
        true
    }

    pub fn preset_labels(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn preferences(&self) -> &FilterPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: FilterPreferences) {
        let stop_syncing = self.preferences.sync_url && !preferences.sync_url;
        self.preferences = preferences;

        write_json(
            &mut *self.durable,
            &self.config.keys.preferences,
            &self.preferences,
        );
        if stop_syncing {
            if let Err(e) = self.location.set_query_param(&self.config.url_param, None) {
                log::warn!("URL update failed: {}", e);
            }
        }
    }

    /// Register a listener; listeners run synchronously in registration order
    pub fn add_change_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&FilterSet) -> Result<()> + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Write pending filter changes (deferred policy). No-op when clean.
    pub fn flush(&mut self) {
        if self.dirty {
            self.write_filters();
        }
    }

    /// True when deferred changes have not reached the channels yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// When pending changes become due: `flush_delay_ms` after the latest
    /// change. Every change pushes the deadline back.
    pub fn flush_deadline(&self) -> Option<Instant> {
        if !self.dirty {
            return None;
        }
        let delay = Duration::from_millis(self.config.flush_delay_ms);
        self.last_change.map(|changed| changed + delay)
    }

    /// Flush if the deadline has passed; returns whether anything was
    /// written. Hosts call this from their own timer or event loop.
    pub fn flush_if_due(&mut self) -> bool {
        match self.flush_deadline() {
            Some(deadline) if Instant::now() >= deadline => {
                self.write_filters();
                true
            }
            _ => false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &FilterStoreConfig {
        &self.config
    }

    /// JSON envelope `{filters, timestamp}` for download
    pub fn export_configuration(&self) -> Result<String> {
        ConfigurationEnvelope::new(self.filters.clone()).to_json()
    }

    /// Load an exported configuration, replacing the active filters
    pub fn import_configuration(&mut self, json: &str) -> Result<Vec<FilterWarning>> {
        let (filters, warnings) = ConfigurationEnvelope::parse(json)?;
        self.filters = filters;
        self.commit();
        Ok(warnings)
    }

    /// Active filters as CSV (`filter,value`)
    pub fn summary_csv(&self) -> Result<String> {
        filters_to_csv(&self.filters)
    }

    fn commit(&mut self) {
        match self.config.persist_policy {
            PersistPolicy::Immediate => self.write_filters(),
            PersistPolicy::Deferred => {
                self.dirty = true;
                self.last_change = Some(Instant::now());
            }
        }
        self.notify();
    }

    fn notify(&mut self) {
        let filters = &self.filters;
        for (id, listener) in self.listeners.iter_mut() {
            if let Err(e) = listener(filters) {
                log::error!("filter change listener {:?} failed: {}", id, e);
            }
        }
    }

    fn write_filters(&mut self) {
        let keys = &self.config.keys;

        if self.preferences.sync_url {
            let encoded = if self.filters.is_empty() {
                Ok(None)
            } else {
                serde_json::to_string(&self.filters).map(Some)
            };
            match encoded {
                Ok(value) => {
                    if let Err(e) = self
                        .location
                        .set_query_param(&self.config.url_param, value.as_deref())
                    {
                        log::warn!("URL update failed: {}", e);
                    }
                }
                Err(e) => log::warn!("could not encode filters for URL: {}", e),
            }
        }

        write_json(&mut *self.durable, &keys.filters, &self.filters);
        write_json(&mut *self.session, &keys.session_filters, &self.filters);
        self.dirty = false;
        self.last_change = None;
    }

    fn write_snapshots(&mut self) {
        write_json(
            &mut *self.durable,
            &self.config.keys.snapshots,
            &self.snapshots,
        );
    }

    fn write_presets(&mut self) {
        write_json(
            &mut *self.durable,
            &self.config.keys.presets,
            &self.presets,
        );
    }
}

impl Drop for FilterStateStore {
    fn drop(&mut self) {
        if self.dirty {
            self.write_filters();
        }
    }
}
