pub mod area;
pub mod builder;
pub mod config;
pub mod constants;
pub mod geo;
