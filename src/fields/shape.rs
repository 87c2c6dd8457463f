use super::boundary::Boundary;
use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

/// Identity the drawing tool gives each shape on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Polygon,
    Rectangle,
    Polyline,
    Circle,
    Marker,
}

/// A shape as reported by the map drawing tool
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub points: Vec<LatLng>,
}

impl DrawnShape {
    pub fn new(id: ShapeId, kind: ShapeKind, points: Vec<LatLng>) -> Self {
        Self { id, kind, points }
    }

    pub fn polygon(id: ShapeId, points: Vec<LatLng>) -> Self {
        Self::new(id, ShapeKind::Polygon, points)
    }

    pub fn rectangle(id: ShapeId, bounds: LatLngBounds) -> Self {
        Self::new(id, ShapeKind::Rectangle, bounds.corners())
    }

    /// Field boundary described by this shape.
    ///
    /// Only polygons and rectangles describe a field; everything else, and
    /// shapes with too few points, yield `None`.
    pub fn boundary(&self) -> Option<Boundary> {
        match self.kind {
            ShapeKind::Polygon => Boundary::polygon(self.points.clone()).ok(),
            ShapeKind::Rectangle => LatLngBounds::from_points(&self.points)
                .and_then(|bounds| Boundary::rectangle(bounds).ok()),
            ShapeKind::Polyline | ShapeKind::Circle | ShapeKind::Marker => None,
        }
    }
}

/// Drawing tool notifications the registry reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Created(DrawnShape),
    Edited(DrawnShape),
    Deleted(DrawnShape),
}
