use super::boundary::Boundary;
use super::field::{Field, FieldId, SyncState};
use super::remote::{FieldRecord, FieldRemote};
use super::shape::{DrawEvent, DrawnShape, ShapeId};
use crate::core::area::FieldArea;
use crate::core::config::FieldRegistryConfig;
use crate::core::geo::LatLng;
use crate::data::export::fields_to_csv;
use crate::prelude::HashMap;
use crate::{Error, Result};

/// Owns the fields drawn on the map.
///
/// Fields are linked to map shapes through the [`ShapeId`] the drawing tool
/// assigns, so edit and delete notifications find their field without
/// comparing geometry.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    config: FieldRegistryConfig,
    fields: HashMap<FieldId, Field>,
    /// Drawing order; later entries sit on top
    order: Vec<FieldId>,
    shapes: HashMap<ShapeId, FieldId>,
    selected: Option<FieldId>,
    drawn: usize,
}

impl FieldRegistry {
    pub fn new(config: FieldRegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &FieldRegistryConfig {
        &self.config
    }

    /// Register a newly drawn shape as a field.
    ///
    /// Returns `None` when the shape is not a usable field outline or the
    /// registry is full.
    pub fn on_boundary_created(&mut self, shape: &DrawnShape) -> Option<&Field> {
        if self.shapes.contains_key(&shape.id) {
            log::debug!("shape {:?} already registered, treating as edit", shape.id);
            return self.on_boundary_edited(shape);
        }

        let Some(boundary) = shape.boundary() else {
            log::debug!("ignoring {:?} shape {:?}", shape.kind, shape.id);
            return None;
        };

        if let Some(max) = self.config.max_fields {
            if self.fields.len() >= max {
                log::warn!("field limit of {} reached, shape {:?} not added", max, shape.id);
                return None;
            }
        }

        let name = format!("{} {}", self.config.default_name_prefix, self.drawn + 1);
        let mut field = match Field::new(FieldId::new(), name, boundary) {
            Ok(field) => field,
            Err(e) => {
                log::warn!("shape {:?} rejected: {}", shape.id, e);
                return None;
            }
        };
        field.shape_id = Some(shape.id);
        self.drawn += 1;

        let id = field.id;
        log::info!("created {} ({:.2} acres)", field.name, field.area.acres);
        self.shapes.insert(shape.id, id);
        self.order.push(id);
        self.fields.insert(id, field);
        self.fields.get(&id)
    }

    /// Apply an edited outline to the field owning the shape
    pub fn on_boundary_edited(&mut self, shape: &DrawnShape) -> Option<&Field> {
        let Some(id) = self.shapes.get(&shape.id).copied() else {
            log::debug!("edit for unknown shape {:?}", shape.id);
            return None;
        };
        let Some(boundary) = shape.boundary() else {
            log::warn!("edited shape {:?} no longer describes a field", shape.id);
            return None;
        };

        let field = self.fields.get_mut(&id)?;
        if let Err(e) = field.set_boundary(boundary) {
            log::warn!("edit of {} rejected: {}", field.name, e);
            return None;
        }
        log::debug!("{} now {:.2} acres", field.name, field.area.acres);
        Some(&*field)
    }

    /// Remove the field owning the shape
    pub fn on_boundary_deleted(&mut self, shape: &DrawnShape) -> Option<Field> {
        let id = self.shapes.get(&shape.id).copied()?;
        self.remove_field(id)
    }

    /// Dispatch a drawing tool notification. Returns the affected field.
    pub fn handle_draw_event(&mut self, event: &DrawEvent) -> Option<FieldId> {
        match event {
            DrawEvent::Created(shape) => self.on_boundary_created(shape).map(|field| field.id),
            DrawEvent::Edited(shape) => self.on_boundary_edited(shape).map(|field| field.id),
            DrawEvent::Deleted(shape) => self.on_boundary_deleted(shape).map(|field| field.id),
        }
    }

    pub fn calculate_area(boundary: &Boundary) -> Option<FieldArea> {
        boundary.area()
    }

    /// Link a field to the map shape now displaying it, e.g. after loading
    pub fn attach_shape(&mut self, id: FieldId, shape_id: ShapeId) -> Result<()> {
        let field = self
            .fields
            .get_mut(&id)
            .ok_or_else(|| Error::UnknownField(id.to_string()))?;

        if let Some(previous) = field.shape_id.replace(shape_id) {
            self.shapes.remove(&previous);
        }
        if let Some(other) = self.shapes.insert(shape_id, id) {
            if other != id {
                if let Some(other) = self.fields.get_mut(&other) {
                    other.shape_id = None;
                }
            }
        }
        Ok(())
    }

    pub fn remove_field(&mut self, id: FieldId) -> Option<Field> {
        let field = self.fields.remove(&id)?;
        self.order.retain(|other| *other != id);
        if let Some(shape_id) = field.shape_id {
            self.shapes.remove(&shape_id);
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::info!("removed {}", field.name);
        Some(field)
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(&id)
    }

    pub fn field_for_shape(&self, shape_id: ShapeId) -> Option<&Field> {
        self.shapes.get(&shape_id).and_then(|id| self.fields.get(id))
    }

    /// Fields in drawing order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.order.iter().filter_map(|id| self.fields.get(id))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn select_field(&mut self, id: FieldId) -> bool {
        if !self.fields.contains_key(&id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Field> {
        self.selected.and_then(|id| self.fields.get(&id))
    }

    pub fn rename_field(&mut self, id: FieldId, name: impl Into<String>) -> Result<()> {
        let field = self
            .fields
            .get_mut(&id)
            .ok_or_else(|| Error::UnknownField(id.to_string()))?;
        field.rename(name);
        Ok(())
    }

    /// Topmost field containing the point
    pub fn field_at(&self, point: &LatLng) -> Option<&Field> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.fields.get(id))
            .find(|field| field.boundary.contains(point))
    }

    pub fn total_area(&self) -> FieldArea {
        FieldArea::from_square_meters(self.fields.values().map(|f| f.area.square_meters).sum())
    }

    /// Fields whose local state has not reached the remote
    pub fn unsynced(&self) -> Vec<&Field> {
        self.fields().filter(|field| !field.is_synced()).collect()
    }

    pub fn export_csv(&self) -> Result<String> {
        fields_to_csv(&self.fields().collect::<Vec<_>>())
    }

    /// Wire record plus the revision it was taken at, for hosts that run the
    /// request themselves and report back through [`Self::complete_save`].
    pub fn prepare_save(&self, id: FieldId) -> Result<(FieldRecord, u64)> {
        let field = self
            .fields
            .get(&id)
            .ok_or_else(|| Error::UnknownField(id.to_string()))?;
        Ok((field.to_record(), field.revision()))
    }

    /// Mark a field saved unless it changed or vanished while the request
    /// was in flight. Returns whether the field is now `Saved`.
    pub fn complete_save(&mut self, id: FieldId, revision: u64) -> bool {
        match self.fields.get_mut(&id) {
            Some(field) => field.mark_saved(revision),
            None => false,
        }
    }

    /// Send one field to the remote. A failure leaves the field as it was
    /// and is returned for the caller to report.
    pub async fn save_field(&mut self, id: FieldId, remote: &dyn FieldRemote) -> Result<()> {
        let (record, revision) = self.prepare_save(id)?;
        if let Err(e) = remote.save_field(&record).await {
            log::warn!("saving field {} failed: {}", record.name, e);
            return Err(e);
        }
        if !self.complete_save(id, revision) {
            log::debug!("{} changed during save, left unsynced", record.name);
        }
        Ok(())
    }

    /// Save every unsynced field. Requests run concurrently; each field's
    /// outcome is returned alongside its id.
    pub async fn save_unsynced(&mut self, remote: &dyn FieldRemote) -> Vec<(FieldId, Result<()>)> {
        let pending: Vec<(FieldId, FieldRecord, u64)> = self
            .unsynced()
            .into_iter()
            .map(|field| (field.id, field.to_record(), field.revision()))
            .collect();

        let outcomes = futures::future::join_all(
            pending
                .iter()
                .map(|(_, record, _)| remote.save_field(record)),
        )
        .await;

        let mut results = Vec::with_capacity(pending.len());
        for ((id, record, revision), outcome) in pending.into_iter().zip(outcomes) {
            match &outcome {
                Ok(()) => {
                    self.complete_save(id, revision);
                }
                Err(e) => log::warn!("saving field {} failed: {}", record.name, e),
            }
            results.push((id, outcome));
        }
        results
    }

    /// Merge the remote's fields into the registry and return how many were
    /// taken. Local fields with unsaved edits are kept as they are.
    pub async fn load_fields(&mut self, remote: &dyn FieldRemote) -> Result<usize> {
        let records = remote.load_fields().await?;
        let mut loaded = 0;

        for record in &records {
            let mut field = match Field::from_record(record) {
                Ok(field) => field,
                Err(e) => {
                    log::warn!("skipping field record {}: {}", record.id, e);
                    continue;
                }
            };

            match self.fields.get(&field.id) {
                Some(local) if local.sync_state != SyncState::Saved => {
                    log::debug!("keeping local edits to {}", local.name);
                    continue;
                }
                Some(local) => field.shape_id = local.shape_id,
                None => self.order.push(field.id),
            }
            self.reserve_name(&field.name);
            self.fields.insert(field.id, field);
            loaded += 1;
        }

        self.drawn = self.drawn.max(self.order.len());
        Ok(loaded)
    }

    /// Keep generated names ahead of "<prefix> N" names already in use
    fn reserve_name(&mut self, name: &str) {
        let taken = name
            .strip_prefix(self.config.default_name_prefix.as_str())
            .and_then(|rest| rest.trim().parse::<usize>().ok());
        if let Some(number) = taken {
            self.drawn = self.drawn.max(number);
        }
    }
}
