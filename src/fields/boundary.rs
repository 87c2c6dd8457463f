use crate::core::area::{open_ring, FieldArea};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::data::geojson::{deserialize_boundary, serialize_boundary, BoundaryGeometry};
use crate::{Error, Result};
use geo::Contains;
use geo_types::{LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Outline of a field.
///
/// Polygon rings are stored open: the closing vertex is implied and never
/// kept. Encoded on the wire as a [`BoundaryGeometry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundaryGeometry", into = "BoundaryGeometry")]
pub enum Boundary {
    Polygon(Vec<LatLng>),
    Rectangle(LatLngBounds),
}

impl Boundary {
    /// Polygon from a ring, open or closed
    pub fn polygon(mut ring: Vec<LatLng>) -> Result<Self> {
        let open_len = open_ring(&ring).len();
        ring.truncate(open_len);

        if ring.len() < 3 {
            return Err(Error::InvalidBoundary(format!(
                "polygon needs at least 3 vertices, got {}",
                ring.len()
            )));
        }
        if let Some(point) = ring.iter().find(|point| !point.is_valid()) {
            return Err(Error::InvalidBoundary(format!(
                "coordinate out of range: {}, {}",
                point.lat, point.lng
            )));
        }
        Ok(Self::Polygon(ring))
    }

    pub fn rectangle(bounds: LatLngBounds) -> Result<Self> {
        if !(bounds.south_west.is_valid() && bounds.north_east.is_valid()) {
            return Err(Error::InvalidBoundary(
                "rectangle corner out of range".to_string(),
            ));
        }
        if !bounds.has_area() {
            return Err(Error::InvalidBoundary("rectangle has no extent".to_string()));
        }
        Ok(Self::Rectangle(bounds))
    }

    /// Open vertex ring; a rectangle yields its four corners
    pub fn ring(&self) -> Vec<LatLng> {
        match self {
            Self::Polygon(ring) => ring.clone(),
            Self::Rectangle(bounds) => bounds.corners(),
        }
    }

    pub fn bounds(&self) -> LatLngBounds {
        match self {
            Self::Polygon(ring) => LatLngBounds::from_points(ring)
                .unwrap_or_else(|| LatLngBounds::new(LatLng::default(), LatLng::default())),
            Self::Rectangle(bounds) => *bounds,
        }
    }

    /// Point-in-field test. Rectangles include their edges; polygons only
    /// their interior.
    pub fn contains(&self, point: &LatLng) -> bool {
        match self {
            Self::Rectangle(bounds) => bounds.contains(point),
            Self::Polygon(ring) => {
                if !self.bounds().contains(point) {
                    return false;
                }
                let exterior: LineString<f64> = ring.iter().copied().collect();
                Polygon::new(exterior, vec![]).contains(&Point::from(*point))
            }
        }
    }

    /// Geodesic area, `None` when the outline encloses nothing
    pub fn area(&self) -> Option<FieldArea> {
        FieldArea::from_ring(&self.ring())
    }
}

impl TryFrom<BoundaryGeometry> for Boundary {
    type Error = Error;

    fn try_from(geometry: BoundaryGeometry) -> Result<Self> {
        deserialize_boundary(&geometry)
    }
}

impl From<Boundary> for BoundaryGeometry {
    fn from(boundary: Boundary) -> Self {
        serialize_boundary(&boundary)
    }
}
