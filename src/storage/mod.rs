pub mod file;
pub mod memory;
pub mod url;
#[cfg(feature = "wasm")]
pub mod web;

// Re-exports for convenience
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use url::QueryStringLocation;
#[cfg(feature = "wasm")]
pub use web::{BrowserLocation, WebStorage};
