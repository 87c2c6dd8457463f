use async_trait::async_trait;
use soilhub::fields::FieldRecord;
use soilhub::{
    Boundary, DrawEvent, DrawnShape, Error, FieldRegistry, FieldRemote, LatLng, LatLngBounds,
    Result, ServicesBuilder, ShapeId, SyncState,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Integration tests for drawing fields and syncing them with a remote
#[cfg(test)]
mod field_registry_tests {
    use super::*;

    /// In-memory fields service. Clones share the stored records.
    #[derive(Clone, Default)]
    struct MockRemote {
        records: Rc<RefCell<Vec<FieldRecord>>>,
        /// Names the service refuses to save
        rejected: Rc<RefCell<Vec<String>>>,
        offline: Rc<RefCell<bool>>,
    }

    impl MockRemote {
        fn stored(&self) -> Vec<FieldRecord> {
            self.records.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl FieldRemote for MockRemote {
        async fn save_field(&self, record: &FieldRecord) -> Result<()> {
            if *self.offline.borrow() {
                return Err(Error::Remote {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            if self.rejected.borrow().contains(&record.name) {
                return Err(Error::Remote {
                    status: 422,
                    message: "invalid field".to_string(),
                });
            }
            let mut records = self.records.borrow_mut();
            records.retain(|existing| existing.id != record.id);
            records.push(record.clone());
            Ok(())
        }

        async fn load_fields(&self) -> Result<Vec<FieldRecord>> {
            if *self.offline.borrow() {
                return Err(Error::Remote {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            Ok(self.stored())
        }
    }

    fn rectangle(id: u64, south: f64, west: f64, size: f64) -> DrawnShape {
        DrawnShape::rectangle(
            ShapeId(id),
            LatLngBounds::from_coords(south, west, south + size, west + size),
        )
    }

    #[tokio::test]
    async fn test_rectangle_survives_save_and_reload() {
        let remote = MockRemote::default();
        let mut registry = FieldRegistry::default();

        let original = registry
            .on_boundary_created(&rectangle(1, 52.1, -106.7, 0.01))
            .unwrap()
            .clone();
        registry.save_field(original.id, &remote).await.unwrap();
        assert_eq!(registry.get(original.id).unwrap().sync_state, SyncState::Saved);

        let mut reloaded = FieldRegistry::default();
        assert_eq!(reloaded.load_fields(&remote).await.unwrap(), 1);

        let field = reloaded.get(original.id).unwrap();
        assert_eq!(field.boundary, original.boundary);
        assert_eq!(field.name, original.name);
        assert_eq!(field.sync_state, SyncState::Saved);
        assert!(field.area.is_close_to(&original.area, 1e-9));
    }

    #[tokio::test]
    async fn test_polygon_survives_save_and_reload() {
        let remote = MockRemote::default();
        let mut registry = FieldRegistry::default();
        let ring = vec![
            LatLng::new(52.10, -106.70),
            LatLng::new(52.10, -106.68),
            LatLng::new(52.12, -106.67),
            LatLng::new(52.13, -106.69),
        ];
        let id = registry
            .on_boundary_created(&DrawnShape::polygon(ShapeId(1), ring.clone()))
            .unwrap()
            .id;
        registry.save_field(id, &remote).await.unwrap();

        let mut reloaded = FieldRegistry::default();
        reloaded.load_fields(&remote).await.unwrap();
        assert_eq!(reloaded.get(id).unwrap().boundary.ring(), ring);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_field_unsaved() {
        let remote = MockRemote::default();
        *remote.offline.borrow_mut() = true;
        let mut registry = FieldRegistry::default();
        let id = registry
            .on_boundary_created(&rectangle(1, 50.0, -105.0, 0.01))
            .unwrap()
            .id;

        let result = registry.save_field(id, &remote).await;
        assert!(matches!(result, Err(Error::Remote { status: 503, .. })));
        assert_eq!(registry.get(id).unwrap().sync_state, SyncState::Unsaved);
        assert_eq!(registry.len(), 1);

        // Retry once the service is back
        *remote.offline.borrow_mut() = false;
        registry.save_field(id, &remote).await.unwrap();
        assert!(registry.unsynced().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_field_save() {
        let remote = MockRemote::default();
        let mut registry = FieldRegistry::default();
        let ghost = soilhub::FieldId::new();
        assert!(matches!(
            registry.save_field(ghost, &remote).await,
            Err(Error::UnknownField(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_after_save_marks_dirty_and_load_keeps_it() {
        let remote = MockRemote::default();
        let mut registry = FieldRegistry::default();
        let id = registry
            .on_boundary_created(&rectangle(1, 50.0, -105.0, 0.01))
            .unwrap()
            .id;
        registry.save_field(id, &remote).await.unwrap();

        let edited = registry
            .on_boundary_edited(&rectangle(1, 50.0, -105.0, 0.02))
            .unwrap()
            .clone();
        assert_eq!(edited.sync_state, SyncState::Dirty);
        assert!(edited.modified_at >= edited.created_at);

        registry.load_fields(&remote).await.unwrap();
        let field = registry.get(id).unwrap();
        assert_eq!(field.sync_state, SyncState::Dirty);
        assert_eq!(field.boundary, edited.boundary);
        assert_eq!(registry.field_for_shape(ShapeId(1)).map(|f| f.id), Some(id));
    }

    #[tokio::test]
    async fn test_load_skips_unusable_records() {
        let remote = MockRemote::default();
        let mut registry = FieldRegistry::default();
        let id = registry
            .on_boundary_created(&rectangle(1, 50.0, -105.0, 0.01))
            .unwrap()
            .id;
        registry.save_field(id, &remote).await.unwrap();

        let mut broken = remote.stored()[0].clone();
        broken.id = "not-a-uuid".to_string();
        remote.records.borrow_mut().push(broken);

        let mut flat = remote.stored()[0].clone();
        flat.id = soilhub::FieldId::new().to_string();
        flat.boundary = soilhub::BoundaryGeometry::Rectangle {
            coordinates: [[-105.0, 50.0], [-104.0, 50.0]],
        };
        remote.records.borrow_mut().push(flat);

        let mut reloaded = FieldRegistry::default();
        assert_eq!(reloaded.load_fields(&remote).await.unwrap(), 1);
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_fields_drawn_after_load_get_fresh_names() {
        let remote = MockRemote::default();
        let mut first = FieldRegistry::default();
        for shape in 1..=3 {
            let south = 50.0 + shape as f64 * 0.1;
            first.on_boundary_created(&rectangle(shape, south, -105.0, 0.01));
        }
        let removed = first.field_for_shape(ShapeId(2)).unwrap().id;
        first.remove_field(removed);
        first.save_unsynced(&remote).await;

        let mut reloaded = FieldRegistry::default();
        assert_eq!(reloaded.load_fields(&remote).await.unwrap(), 2);
        let drawn = reloaded
            .on_boundary_created(&rectangle(9, 51.0, -105.0, 0.01))
            .unwrap();
        assert_eq!(drawn.name, "Field 4");

        let names: Vec<&str> = reloaded.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names.iter().filter(|name| **name == "Field 4").count(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_leaves_registry_untouched() {
        let remote = MockRemote::default();
        *remote.offline.borrow_mut() = true;
        let mut registry = FieldRegistry::default();
        registry.on_boundary_created(&rectangle(1, 50.0, -105.0, 0.01));

        assert!(registry.load_fields(&remote).await.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_save_unsynced_reports_each_field() {
        let remote = MockRemote::default();
        let mut registry = FieldRegistry::default();
        registry.on_boundary_created(&rectangle(1, 50.0, -105.0, 0.01));
        registry.on_boundary_created(&rectangle(2, 50.1, -105.0, 0.01));
        registry.on_boundary_created(&rectangle(3, 50.2, -105.0, 0.01));
        remote.rejected.borrow_mut().push("Field 2".to_string());

        let outcomes = registry.save_unsynced(&remote).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes.iter().filter(|(_, outcome)| outcome.is_err()).count(), 1);

        let unsynced: Vec<&str> = registry.unsynced().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(unsynced, vec!["Field 2"]);
        assert_eq!(remote.stored().len(), 2);
    }

    #[tokio::test]
    async fn test_services_use_configured_remote() {
        let remote = MockRemote::default();
        let mut services = ServicesBuilder::new()
            .with_remote(remote.clone())
            .build()
            .unwrap();

        let id = services
            .fields
            .on_boundary_created(&rectangle(1, 50.0, -105.0, 0.01))
            .unwrap()
            .id;
        services.save_field(id).await.unwrap();
        assert_eq!(remote.stored().len(), 1);

        let mut fresh = ServicesBuilder::new().with_remote(remote).build().unwrap();
        assert_eq!(fresh.load_fields().await.unwrap(), 1);
        assert!(fresh.fields.get(id).is_some());
    }

    #[tokio::test]
    async fn test_services_without_remote() {
        let mut services = ServicesBuilder::new().build().unwrap();
        assert!(matches!(
            services.load_fields().await,
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_draw_event_lifecycle() {
        let mut registry = FieldRegistry::default();

        let created = registry
            .handle_draw_event(&DrawEvent::Created(rectangle(5, 50.0, -105.0, 0.01)))
            .unwrap();
        assert!(registry.select_field(created));

        let edited = registry
            .handle_draw_event(&DrawEvent::Edited(rectangle(5, 50.0, -105.0, 0.03)))
            .unwrap();
        assert_eq!(edited, created);

        let deleted = registry
            .handle_draw_event(&DrawEvent::Deleted(rectangle(5, 0.0, 0.0, 1.0)))
            .unwrap();
        assert_eq!(deleted, created);
        assert!(registry.is_empty());
        assert!(registry.selected().is_none());
        assert!(registry
            .handle_draw_event(&DrawEvent::Deleted(rectangle(5, 0.0, 0.0, 1.0)))
            .is_none());
    }

    #[test]
    fn test_one_degree_equatorial_box() {
        let boundary =
            Boundary::rectangle(LatLngBounds::from_coords(0.0, 0.0, 1.0, 1.0)).unwrap();
        let area = FieldRegistry::calculate_area(&boundary).unwrap();

        // About 12,300 km² or 3 million acres
        assert!((area.square_meters / 1.0e6 - 12_300.0).abs() < 250.0);
        assert!(area.acres > 2.9e6 && area.acres < 3.2e6);
        assert!((area.hectares - area.square_meters / 10_000.0).abs() < 1e-6);
    }
}
