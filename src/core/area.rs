//! Geodesic area of field rings.
//!
//! Rings are geographic (lat/lng) coordinates, so the area is computed as the
//! spherical excess of the ring rather than a planar shoelace over degrees,
//! which distorts badly away from the equator.

use crate::core::constants::{ACRES_PER_SQUARE_METER, HECTARES_PER_SQUARE_METER};
use crate::core::geo::LatLng;
use geo::ChamberlainDuquetteArea;
use geo_types::{LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Area of a field in the units the advisory UI displays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldArea {
    pub square_meters: f64,
    pub acres: f64,
    pub hectares: f64,
}

impl FieldArea {
    pub fn from_square_meters(square_meters: f64) -> Self {
        Self {
            square_meters,
            acres: square_meters * ACRES_PER_SQUARE_METER,
            hectares: square_meters * HECTARES_PER_SQUARE_METER,
        }
    }

    /// Area enclosed by a ring, `None` when the ring cannot enclose any
    pub fn from_ring(ring: &[LatLng]) -> Option<Self> {
        geodesic_ring_area(ring).map(Self::from_square_meters)
    }

    pub fn is_close_to(&self, other: &FieldArea, relative_tolerance: f64) -> bool {
        let scale = self.square_meters.abs().max(other.square_meters.abs()).max(1.0);
        (self.square_meters - other.square_meters).abs() <= scale * relative_tolerance
    }
}

/// Unsigned spherical-excess area in square meters.
///
/// The ring may be open or closed; orientation does not matter. Returns
/// `None` for fewer than three distinct vertices, out-of-range coordinates
/// or a ring that encloses nothing.
pub fn geodesic_ring_area(ring: &[LatLng]) -> Option<f64> {
    let ring = open_ring(ring);
    if ring.len() < 3 || ring.iter().any(|point| !point.is_valid()) {
        return None;
    }

    let exterior: LineString<f64> = ring.iter().copied().collect();
    let area = Polygon::new(exterior, vec![]).chamberlain_duquette_unsigned_area();

    if area.is_finite() && area > 0.0 {
        Some(area)
    } else {
        None
    }
}

/// Drops the closing vertex when the ring repeats its first point.
pub(crate) fn open_ring(ring: &[LatLng]) -> &[LatLng] {
    match ring {
        [first, .., last] if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(center: LatLng, half_size: f64) -> Vec<LatLng> {
        vec![
            LatLng::new(center.lat - half_size, center.lng - half_size),
            LatLng::new(center.lat - half_size, center.lng + half_size),
            LatLng::new(center.lat + half_size, center.lng + half_size),
            LatLng::new(center.lat + half_size, center.lng - half_size),
        ]
    }

    #[test]
    fn test_unit_degree_box_at_equator() {
        let ring = square(LatLng::new(0.5, 0.5), 0.5);
        let area = FieldArea::from_ring(&ring).unwrap();

        // A 1° x 1° cell at the equator covers roughly 12 300 km²
        assert!(area.square_meters > 1.20e10 && area.square_meters < 1.26e10);
        assert!(area.acres > 2.9e6 && area.acres < 3.2e6);
        assert!((area.hectares - area.square_meters * 0.0001).abs() < 1e-6);
    }

    #[test]
    fn test_high_latitude_box_is_smaller() {
        let equator = FieldArea::from_ring(&square(LatLng::new(0.0, 10.0), 0.01)).unwrap();
        let prairie = FieldArea::from_ring(&square(LatLng::new(60.0, 10.0), 0.01)).unwrap();

        // Meridians converge: cos(60°) halves the east-west extent
        let ratio = prairie.square_meters / equator.square_meters;
        assert!((ratio - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_orientation_and_closure_do_not_matter() {
        let ring = square(LatLng::new(52.0, -106.0), 0.005);
        let mut reversed = ring.clone();
        reversed.reverse();
        let mut closed = ring.clone();
        closed.push(ring[0]);

        let a = geodesic_ring_area(&ring).unwrap();
        assert!((a - geodesic_ring_area(&reversed).unwrap()).abs() < 1e-6);
        assert!((a - geodesic_ring_area(&closed).unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_rings() {
        assert!(geodesic_ring_area(&[]).is_none());
        assert!(geodesic_ring_area(&[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]).is_none());
        let collinear = [
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(0.0, 2.0),
        ];
        assert!(geodesic_ring_area(&collinear).is_none());
        let invalid = [
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(95.0, 1.0),
        ];
        assert!(geodesic_ring_area(&invalid).is_none());
    }

    proptest! {
        #[test]
        fn prop_area_grows_with_ring_scale(
            lat in -60.0..60.0f64,
            lng in -170.0..170.0f64,
            half_size in 0.001..1.0f64,
            factor in 1.05..3.0f64,
        ) {
            let center = LatLng::new(lat, lng);
            let small = geodesic_ring_area(&square(center, half_size)).unwrap();
            let large = geodesic_ring_area(&square(center, half_size * factor)).unwrap();
            prop_assert!(small > 0.0);
            prop_assert!(large > small);
        }
    }
}
