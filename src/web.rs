//! Browser adapters: `localStorage` as a [`StoragePort`] and `Date.now()` as
//! a [`Clock`].
//!
//! Only built with the `web` feature. The rest of the crate never touches
//! `web-sys`, so everything else runs and tests natively.

use chrono::{DateTime, Utc};
use wasm_bindgen::JsValue;

use crate::clock::Clock;
use crate::error::StorageError;
use crate::storage::StoragePort;

/// [`StoragePort`] over `window.localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Bind to the current window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] outside a window context or when
    /// storage is disabled.
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = window.local_storage().map_err(|e| js_error(&e))?.ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl StoragePort for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| js_error(&e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|e| js_error(&e))
    }
}

fn js_error(err: &JsValue) -> StorageError {
    match js_sys::Reflect::get(err, &JsValue::from_str("name")) {
        Ok(name) if name.as_string().as_deref() == Some("QuotaExceededError") => StorageError::QuotaExceeded,
        _ => StorageError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}"))),
    }
}

/// [`Clock`] backed by `Date.now()`; `Utc::now` has no time source on
/// `wasm32-unknown-unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}
