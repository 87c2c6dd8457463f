use super::boundary::Boundary;
use super::remote::FieldRecord;
use super::shape::ShapeId;
use crate::core::area::FieldArea;
use crate::data::geojson::serialize_boundary;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Uuid);

impl FieldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| Error::ParseError(format!("invalid field id {:?}: {}", value, e)))
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether the remote copy of a field matches the local one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Never saved
    Unsaved,
    Saved,
    /// Saved once, edited since
    Dirty,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsaved => "unsaved",
            Self::Saved => "saved",
            Self::Dirty => "dirty",
        }
    }
}

/// A user-drawn farm field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub boundary: Boundary,
    pub area: FieldArea,
    pub sync_state: SyncState,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Map shape currently showing this field, if any
    #[serde(skip)]
    pub shape_id: Option<ShapeId>,
    #[serde(skip)]
    revision: u64,
}

impl Field {
    pub fn new(id: FieldId, name: impl Into<String>, boundary: Boundary) -> Result<Self> {
        let area = area_of(&boundary)?;
        let now = Utc::now();
        Ok(Self {
            id,
            name: name.into(),
            boundary,
            area,
            sync_state: SyncState::Unsaved,
            created_at: now,
            modified_at: now,
            shape_id: None,
            revision: 0,
        })
    }

    /// Replace the outline and recompute the area. On error the field is
    /// left untouched.
    pub fn set_boundary(&mut self, boundary: Boundary) -> Result<()> {
        self.area = area_of(&boundary)?;
        self.boundary = boundary;
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Local edit counter, bumped on every change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mark saved if nothing changed since `revision` was read.
    pub(crate) fn mark_saved(&mut self, revision: u64) -> bool {
        if self.revision != revision {
            return false;
        }
        self.sync_state = SyncState::Saved;
        true
    }

    pub fn is_synced(&self) -> bool {
        self.sync_state == SyncState::Saved
    }

    pub fn to_record(&self) -> FieldRecord {
        FieldRecord {
            id: self.id.to_string(),
            name: self.name.clone(),
            boundary: serialize_boundary(&self.boundary),
            area_acres: Some(self.area.acres),
            created_at: Some(self.created_at),
            modified_at: Some(self.modified_at),
        }
    }

    /// Rebuild a field from its remote record. The area is always recomputed
    /// locally; the remote's figure is ignored.
    pub fn from_record(record: &FieldRecord) -> Result<Self> {
        let id = FieldId::parse(&record.id)?;
        let boundary = Boundary::try_from(record.boundary.clone())?;
        let mut field = Self::new(id, record.name.clone(), boundary)?;
        if let Some(created_at) = record.created_at {
            field.created_at = created_at;
        }
        field.modified_at = record.modified_at.unwrap_or(field.created_at);
        field.sync_state = SyncState::Saved;
        Ok(field)
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
        self.revision += 1;
        if self.sync_state == SyncState::Saved {
            self.sync_state = SyncState::Dirty;
        }
    }
}

fn area_of(boundary: &Boundary) -> Result<FieldArea> {
    boundary
        .area()
        .ok_or_else(|| Error::InvalidBoundary("boundary encloses no area".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLngBounds;

    fn quarter_section() -> Boundary {
        Boundary::rectangle(LatLngBounds::from_coords(52.0, -106.0, 52.007, -105.9885)).unwrap()
    }

    #[test]
    fn test_new_field_is_unsaved_with_area() {
        let field = Field::new(FieldId::new(), "Home quarter", quarter_section()).unwrap();
        assert_eq!(field.sync_state, SyncState::Unsaved);
        // A quarter section is about 160 acres
        assert!((field.area.acres - 160.0).abs() < 15.0);
    }

    #[test]
    fn test_edits_dirty_a_saved_field() {
        let mut field = Field::new(FieldId::new(), "Home quarter", quarter_section()).unwrap();
        let revision = field.revision();
        assert!(field.mark_saved(revision));

        field.rename("Home quarter (east)");
        assert_eq!(field.sync_state, SyncState::Dirty);
        assert!(!field.mark_saved(revision));
        assert_eq!(field.sync_state, SyncState::Dirty);
    }

    #[test]
    fn test_collinear_boundary_rejected_without_change() {
        let mut field = Field::new(FieldId::new(), "Home quarter", quarter_section()).unwrap();
        let before = field.clone();
        let line = Boundary::Polygon(vec![
            crate::LatLng::new(52.0, -106.0),
            crate::LatLng::new(52.0, -105.99),
            crate::LatLng::new(52.0, -105.98),
        ]);
        assert!(matches!(field.set_boundary(line), Err(Error::InvalidBoundary(_))));
        assert_eq!(field, before);
    }

    #[test]
    fn test_record_round_trip_recomputes_area() {
        let field = Field::new(FieldId::new(), "Home quarter", quarter_section()).unwrap();
        let mut record = field.to_record();
        record.area_acres = Some(1.0);

        let restored = Field::from_record(&record).unwrap();
        assert_eq!(restored.id, field.id);
        assert_eq!(restored.boundary, field.boundary);
        assert!(restored.area.is_close_to(&field.area, 1e-12));
        assert_eq!(restored.sync_state, SyncState::Saved);
    }
}
