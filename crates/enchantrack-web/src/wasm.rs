#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the TrackerRunner.
//!
//! This module wraps [`super::runner_core::RunnerCore`] with JS-friendly types
//! and a `localStorage`-backed store. Only compiled on `wasm32` targets.

use enchantrack_core::error::StorageError;
use enchantrack_core::storage::KeyValueStore;
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::runner_core::RunnerCore;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "localStorage error".to_string())
}

/// `window.localStorage`, or nothing when the page runs without it
/// (private mode, sandboxed iframes).
struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    fn open() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            console_error("localStorage unavailable; progress will not persist");
        }
        Self { storage }
    }

    fn backend(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::unavailable("localStorage is not available"))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(storage) = &self.storage else {
            return Ok(None);
        };
        storage
            .get_item(key)
            .map_err(|error| StorageError::unavailable(js_error_message(&error)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend()?
            .set_item(key, value)
            .map_err(|error| StorageError::unavailable(js_error_message(&error)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.backend()?
            .remove_item(key)
            .map_err(|error| StorageError::unavailable(js_error_message(&error)))
    }
}

#[wasm_bindgen]
pub struct TrackerRunner {
    inner: RunnerCore<LocalStorage>,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl TrackerRunner {
    /// Restore progress and view mode from `localStorage`. Icon paths in
    /// frames are prefixed with `icon_root`.
    #[wasm_bindgen(constructor)]
    pub fn new(icon_root: &str) -> Self {
        install_panic_hook();
        Self {
            inner: RunnerCore::new(LocalStorage::open(), icon_root),
        }
    }

    /// Register a catalog fetch. Pass the returned ticket to
    /// `finishCatalogLoad` or `failCatalogLoad`.
    #[wasm_bindgen(js_name = beginCatalogLoad)]
    pub fn begin_catalog_load(&mut self) -> f64 {
        self.inner.begin_catalog_load() as f64
    }

    /// Hand over the fetched catalog text, or `undefined` for a 404.
    /// Returns `"loaded"`, `"missing"`, `"stale"` or `"rejected"`.
    #[wasm_bindgen(js_name = finishCatalogLoad)]
    pub fn finish_catalog_load(&mut self, ticket: f64, label: &str, text: Option<String>) -> String {
        self.inner
            .finish_catalog_load(ticket as u64, label, text)
            .to_string()
    }

    /// Report a network failure. Returns `true` if a notice was queued.
    #[wasm_bindgen(js_name = failCatalogLoad)]
    pub fn fail_catalog_load(&mut self, ticket: f64, label: &str, reason: &str) -> bool {
        self.inner.fail_catalog_load(ticket as u64, label, reason)
    }

    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&mut self, biome: &str, status: &str, item_type: &str, search: &str) -> bool {
        self.inner.set_filter(biome, status, item_type, search)
    }

    /// Flip the collected flag. `undefined` when saving failed.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        self.inner.toggle(name)
    }

    /// Flip one level. `undefined` when the level is out of range or saving failed.
    #[wasm_bindgen(js_name = toggleLevel)]
    pub fn toggle_level(&mut self, name: &str, level: u32) -> Option<bool> {
        self.inner.toggle_level(name, level)
    }

    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&mut self, mode: &str) -> bool {
        self.inner.set_view_mode(mode)
    }

    /// Export snapshot JSON for download.
    #[wasm_bindgen(js_name = exportProgress)]
    pub fn export_progress(&mut self) -> Option<String> {
        self.inner.export_progress()
    }

    #[wasm_bindgen(js_name = importProgress)]
    pub fn import_progress(&mut self, text: &str) -> bool {
        self.inner.import_progress(text)
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) -> bool {
        self.inner.clear_all()
    }

    /// Latest frame: cards, stats, criteria and view mode.
    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> String {
        self.inner.frame_json()
    }

    /// Render counter; unchanged means the last frame is still current.
    #[wasm_bindgen(js_name = frameGeneration)]
    pub fn frame_generation(&self) -> f64 {
        self.inner.frame_generation() as f64
    }

    /// Biomes and item types present in the loaded catalog.
    #[wasm_bindgen(js_name = filterOptionsJson)]
    pub fn filter_options_json(&self) -> String {
        self.inner.filter_options_json()
    }

    /// Drain queued notices as a JSON array of `{level, message}`.
    #[wasm_bindgen(js_name = takeNotices)]
    pub fn take_notices(&mut self) -> String {
        self.inner.take_notices_json()
    }
}
