use crate::core::geo::{LatLng, LatLngBounds};
use crate::fields::Boundary;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// GeoJSON-style encoding of a field boundary.
///
/// Polygons follow GeoJSON (`[lng, lat]` positions, closed ring). Rectangles
/// use a non-standard `Rectangle` type holding the south-west and north-east
/// corners as `[[west, south], [east, north]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    Rectangle { coordinates: [[f64; 2]; 2] },
}

/// Either a bare geometry or a Feature wrapping one
#[derive(Deserialize)]
#[serde(untagged)]
enum BoundaryDocument {
    Feature { geometry: BoundaryGeometry },
    Geometry(BoundaryGeometry),
}

pub fn serialize_boundary(boundary: &Boundary) -> BoundaryGeometry {
    match boundary {
        Boundary::Polygon(ring) => {
            let mut positions: Vec<[f64; 2]> = ring.iter().map(LatLng::to_position).collect();
            if let Some(first) = positions.first().copied() {
                positions.push(first);
            }
            BoundaryGeometry::Polygon {
                coordinates: vec![positions],
            }
        }
        Boundary::Rectangle(bounds) => BoundaryGeometry::Rectangle {
            coordinates: [
                bounds.south_west.to_position(),
                bounds.north_east.to_position(),
            ],
        },
    }
}

/// Rebuild a boundary. Polygons with holes are rejected.
pub fn deserialize_boundary(geometry: &BoundaryGeometry) -> Result<Boundary> {
    match geometry {
        BoundaryGeometry::Polygon { coordinates } => match coordinates.as_slice() {
            [exterior] => Boundary::polygon(
                exterior
                    .iter()
                    .copied()
                    .map(LatLng::from_position)
                    .collect(),
            ),
            [] => Err(Error::InvalidBoundary("polygon has no rings".to_string())),
            rings => Err(Error::InvalidBoundary(format!(
                "polygon holes are not supported ({} rings)",
                rings.len()
            ))),
        },
        BoundaryGeometry::Rectangle { coordinates } => {
            let corners = coordinates.map(LatLng::from_position);
            let bounds = LatLngBounds::from_points(&corners)
                .ok_or_else(|| Error::InvalidBoundary("rectangle has no corners".to_string()))?;
            Boundary::rectangle(bounds)
        }
    }
}

/// Parse a boundary from a geometry or Feature document
pub fn from_json_str(json: &str) -> Result<Boundary> {
    let document: BoundaryDocument = serde_json::from_str(json)
        .map_err(|e| Error::ParseError(format!("Invalid boundary GeoJSON: {}", e)))?;
    let geometry = match document {
        BoundaryDocument::Feature { geometry } | BoundaryDocument::Geometry(geometry) => geometry,
    };
    deserialize_boundary(&geometry)
}
