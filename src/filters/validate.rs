//! Filter sanitizing.
//!
//! Nothing here rejects input: out-of-range values are clamped and malformed
//! entries dropped, so callers always get a usable filter set back. The only
//! user-visible signal is an optional warning list for the UI banner.

use super::value::{FilterSet, FilterValue, RangeValue};
use serde::Serialize;

pub const SOIL_PH_RANGE: &str = "soil_ph_range";
pub const GROWING_SEASON_RANGE: &str = "growing_season_range";

/// Lowest soil pH the range filter accepts
pub const MIN_SOIL_PH: f64 = 3.0;

/// Shortest growing season (days) the range filter accepts
pub const MIN_GROWING_SEASON_DAYS: f64 = 30.0;

/// Non-blocking notice produced while sanitizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterWarning {
    /// The range arrived with `min > max` and was collapsed
    InvertedRange { key: String },
    /// The entry had no usable shape and was removed
    Dropped { key: String },
}

/// Sanitize arbitrary JSON into a filter set
pub fn validate_filters(input: &serde_json::Value) -> FilterSet {
    sanitize_with_warnings(input).0
}

/// Same as [`validate_filters`], also reporting what was corrected
pub fn sanitize_with_warnings(input: &serde_json::Value) -> (FilterSet, Vec<FilterWarning>) {
    let (mut set, dropped) = FilterSet::from_json_value(input);
    let mut warnings: Vec<FilterWarning> = dropped
        .into_iter()
        .map(|key| FilterWarning::Dropped { key })
        .collect();
    warnings.extend(set.sanitize_in_place());
    (set, warnings)
}

impl FilterSet {
    /// Clamped copy of this set
    pub fn sanitized(mut self) -> Self {
        self.sanitize_in_place();
        self
    }

    /// Drop empty values and clamp every range in place.
    ///
    /// `soil_ph_range` and `growing_season_range` first pull `min` into
    /// `[floor, max]`, then raise `max` to at least `min`; any other range
    /// only gets the second step. The two known range keys are removed when
    /// they hold anything other than a range.
    pub(crate) fn sanitize_in_place(&mut self) -> Vec<FilterWarning> {
        let mut warnings = Vec::new();

        self.retain(|key, value| {
            if value.is_empty() {
                warnings.push(FilterWarning::Dropped { key: key.clone() });
                return false;
            }
            let is_known_range = key == SOIL_PH_RANGE || key == GROWING_SEASON_RANGE;
            if is_known_range && value.as_range().is_none() {
                warnings.push(FilterWarning::Dropped { key: key.clone() });
                return false;
            }
            true
        });

        for (key, value) in self.values_mut() {
            let FilterValue::Range(range) = value else {
                continue;
            };
            if range.min > range.max {
                warnings.push(FilterWarning::InvertedRange { key: key.clone() });
            }
            *range = match key.as_str() {
                SOIL_PH_RANGE => clamp_range(*range, Some(MIN_SOIL_PH)),
                GROWING_SEASON_RANGE => clamp_range(*range, Some(MIN_GROWING_SEASON_DAYS)),
                _ => clamp_range(*range, None),
            };
        }

        warnings
    }
}

fn clamp_range(range: RangeValue, floor: Option<f64>) -> RangeValue {
    let min = match floor {
        Some(floor) => floor.max(range.min.min(range.max)),
        None => range.min,
    };
    let max = range.max.max(min);
    RangeValue::new(min, max)
}
