//! Browser localStorage Backend (wasm32 only)

use crate::error::StoreError;
use super::backend::KeyValueBackend;

/// `window.localStorage` of the current origin
///
/// The storage handle is looked up on every call so the backend stays
/// `Send + Sync` on the single UI thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserBackend;

impl BrowserBackend {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Backend("no window".to_string()))?;
        window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| StoreError::Backend("localStorage unavailable".to_string()))
    }
}

impl KeyValueBackend for BrowserBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?.get_item(key).map_err(js_err)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?.set_item(key, value).map_err(|e| {
            // Browsers reject over-quota writes with a QuotaExceededError DOMException
            let text = format!("{:?}", e);
            if text.contains("QuotaExceeded") {
                StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    limit: 0,
                }
            } else {
                StoreError::Backend(text)
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Self::storage()?.remove_item(key).map_err(js_err)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let storage = Self::storage()?;
        let len = storage.length().map_err(js_err)?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = storage.key(index).map_err(js_err)? {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn js_err(e: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Backend(format!("{:?}", e))
}
