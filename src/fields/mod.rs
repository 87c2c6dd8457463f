//! User-drawn farm fields: outlines, areas and remote persistence.

pub mod boundary;
pub mod field;
pub mod registry;
pub mod remote;
pub mod shape;

pub use boundary::Boundary;
pub use field::{Field, FieldId, SyncState};
pub use registry::FieldRegistry;
pub use remote::{FieldRecord, FieldRemote, HttpFieldRemote};
pub use shape::{DrawEvent, DrawnShape, ShapeId, ShapeKind};
