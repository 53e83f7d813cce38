#![forbid(unsafe_code)]

//! Browser runner for the enchanted-book tracker.
//!
//! [`TrackerRunner`] is a `wasm-bindgen`-exported struct wrapping an
//! `enchantrack_core::Tracker` persisted to `localStorage`. The page owns
//! fetching catalog files and drawing; it pulls frames as JSON after each
//! call and drains queued notices.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::TrackerRunner;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
