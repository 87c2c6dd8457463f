use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate from a GeoJSON `[lng, lat]` position
    pub fn from_position(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }

    /// GeoJSON `[lng, lat]` position
    pub fn to_position(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<LatLng> for geo_types::Coord<f64> {
    fn from(value: LatLng) -> Self {
        geo_types::Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(value: LatLng) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds covering every point, `None` for an empty slice
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Corner ring, counter-clockwise from the south-west corner
    pub fn corners(&self) -> Vec<LatLng> {
        vec![
            self.south_west,
            LatLng::new(self.south_west.lat, self.north_east.lng),
            self.north_east,
            LatLng::new(self.north_east.lat, self.south_west.lng),
        ]
    }

    /// True when the box has a non-zero extent on both axes
    pub fn has_area(&self) -> bool {
        self.north_east.lat > self.south_west.lat && self.north_east.lng > self.south_west.lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(52.1332, -106.6700);
        assert_eq!(coord.lat, 52.1332);
        assert_eq!(coord.lng, -106.6700);
        assert!(coord.is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_position_order() {
        let coord = LatLng::from_position([-106.67, 52.13]);
        assert_eq!(coord.lat, 52.13);
        assert_eq!(coord.to_position(), [-106.67, 52.13]);
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = LatLngBounds::from_points(&[
            LatLng::new(50.0, -105.0),
            LatLng::new(51.0, -104.0),
            LatLng::new(50.5, -106.0),
        ])
        .unwrap();
        assert_eq!(bounds, LatLngBounds::from_coords(50.0, -106.0, 51.0, -104.0));
        assert!(bounds.contains(&LatLng::new(50.5, -105.0)));
        assert!(!bounds.contains(&LatLng::new(52.0, -105.0)));
        assert!(LatLngBounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_corners_ring() {
        let bounds = LatLngBounds::from_coords(0.0, 0.0, 1.0, 2.0);
        let ring = bounds.corners();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[2], LatLng::new(1.0, 2.0));
        assert!(bounds.has_area());
        assert!(!LatLngBounds::from_coords(0.0, 0.0, 0.0, 2.0).has_area());
    }
}
