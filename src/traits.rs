//! Persistence seams shared by the filter store and its channels
//!
//! A channel is anything that can hold string values between page loads:
//! browser `localStorage`/`sessionStorage`, a directory on disk, or a plain
//! in-memory map in tests. The URL is modeled separately because it holds
//! query parameters rather than keyed documents.

use crate::Result;

/// Key/value storage channel (durable or session-scoped)
pub trait StorageChannel {
    /// Channel name used in log messages
    fn name(&self) -> &str;

    /// Read a value; `Ok(None)` when the key was never written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Page location whose query string carries shareable state
pub trait LocationChannel {
    /// Decoded value of a query parameter
    fn query_param(&self, name: &str) -> Result<Option<String>>;

    /// Set (`Some`) or drop (`None`) a query parameter, keeping the others
    fn set_query_param(&mut self, name: &str, value: Option<&str>) -> Result<()>;
}
