//! Interchange formats: boundary GeoJSON and file exports.

pub mod export;
pub mod geojson;
