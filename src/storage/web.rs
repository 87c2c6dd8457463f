//! Browser-backed channels: `localStorage`, `sessionStorage` and the page URL.

use super::url::{read_param, write_param};
use crate::traits::{LocationChannel, StorageChannel};
use crate::{Error, Result};
use reqwest::Url;
use wasm_bindgen::JsValue;

fn js_error(context: &str, err: JsValue) -> Error {
    Error::Storage(format!("{}: {:?}", context, err))
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| Error::Storage("no window available".to_string()))
}

/// `window.localStorage` or `window.sessionStorage`
pub struct WebStorage {
    name: String,
    storage: web_sys::Storage,
}

impl WebStorage {
    /// Durable browser storage
    pub fn local() -> Result<Self> {
        let storage = window()?
            .local_storage()
            .map_err(|e| js_error("localStorage", e))?
            .ok_or_else(|| Error::Storage("localStorage disabled".to_string()))?;
        Ok(Self {
            name: "localStorage".to_string(),
            storage,
        })
    }

    /// Same-tab browser storage
    pub fn session() -> Result<Self> {
        let storage = window()?
            .session_storage()
            .map_err(|e| js_error("sessionStorage", e))?
            .ok_or_else(|| Error::Storage("sessionStorage disabled".to_string()))?;
        Ok(Self {
            name: "sessionStorage".to_string(),
            storage,
        })
    }
}

impl StorageChannel for WebStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error(&self.name, e))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        // Quota errors surface here as a DOMException
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error(&self.name, e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error(&self.name, e))
    }
}

/// The page URL, updated in place through `history.replaceState` so filter
/// changes never add navigation entries.
pub struct BrowserLocation {
    window: web_sys::Window,
}

impl BrowserLocation {
    pub fn new() -> Result<Self> {
        Ok(Self { window: window()? })
    }

    fn current_url(&self) -> Result<Url> {
        let href = self
            .window
            .location()
            .href()
            .map_err(|e| js_error("location", e))?;
        Url::parse(&href).map_err(|e| Error::ParseError(format!("Invalid URL: {}", e)))
    }
}

impl LocationChannel for BrowserLocation {
    fn query_param(&self, name: &str) -> Result<Option<String>> {
        let url = self.current_url()?;
        Ok(read_param(&url, name))
    }

    fn set_query_param(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let mut url = self.current_url()?;
        write_param(&mut url, name, value);
        self.window
            .history()
            .map_err(|e| js_error("history", e))?
            .replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
            .map_err(|e| js_error("history", e))
    }
}
