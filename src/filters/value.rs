use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Inclusive numeric range; `min <= max` once sanitized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    pub min: f64,
    pub max: f64,
}

impl RangeValue {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Value of a single filter criterion.
///
/// Encoded untagged so the JSON matches what the filtering UI writes:
/// `["wheat","barley"]`, `{"min":6,"max":7.5}` or `"drought_tolerant"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Categories(BTreeSet<String>),
    Range(RangeValue),
    Token(String),
}

impl FilterValue {
    pub fn categories<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categories(tokens.into_iter().map(Into::into).collect())
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::Range(RangeValue::new(min, max))
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    /// A value that constrains nothing and must not be stored
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Categories(tokens) => tokens.is_empty(),
            Self::Range(range) => !(range.min.is_finite() && range.max.is_finite()),
            Self::Token(token) => token.is_empty(),
        }
    }

    pub fn as_range(&self) -> Option<&RangeValue> {
        match self {
            Self::Range(range) => Some(range),
            _ => None,
        }
    }

    /// Human-readable form used in summaries and CSV exports
    pub fn display(&self) -> String {
        match self {
            Self::Categories(tokens) => tokens.iter().cloned().collect::<Vec<_>>().join(", "),
            Self::Range(range) => format!("{} - {}", range.min, range.max),
            Self::Token(token) => token.clone(),
        }
    }
}

/// Active filter criteria keyed by filter name.
///
/// A missing key means "no constraint". The map never holds an empty value:
/// inserting one removes the key instead, and decoding drops it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, FilterValue>);

impl<'de> Deserialize<'de> for FilterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, FilterValue>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient decoding from arbitrary JSON.
    ///
    /// Non-object input yields an empty set; entries whose shape is not a
    /// filter value (null, numbers, half-open ranges, empty arrays) are
    /// dropped. Returns the keys that were dropped alongside the set.
    pub fn from_json_value(value: &serde_json::Value) -> (Self, Vec<String>) {
        let mut set = Self::new();
        let mut dropped = Vec::new();

        let Some(object) = value.as_object() else {
            return (set, dropped);
        };

        for (key, raw) in object {
            match serde_json::from_value::<FilterValue>(raw.clone()) {
                Ok(value) if !value.is_empty() => {
                    set.0.insert(key.clone(), value);
                }
                _ => dropped.push(key.clone()),
            }
        }

        (set, dropped)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace a value; an empty value removes the key
    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) {
        let key = key.into();
        if value.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.remove(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = (&String, &mut FilterValue)> {
        self.0.iter_mut()
    }

    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&String, &mut FilterValue) -> bool,
    {
        self.0.retain(keep);
    }
}

impl<K: Into<String>> FromIterator<(K, FilterValue)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, FilterValue)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}
