#![forbid(unsafe_code)]

//! Core of the librarian enchantment tracker.
//!
//! The crate is host-agnostic: it owns the catalog, the per-enchantment
//! progress map, filtering, statistics and the item taxonomy used to group
//! and label items. Hosts (the terminal CLI and the browser runner) supply a
//! [`storage::KeyValueStore`] and a [`tracker::TrackerView`] and drive a
//! [`tracker::Tracker`].
//!
//! # Example
//!
//! ```
//! use enchantrack_core::catalog::CatalogSource;
//! use enchantrack_core::storage::MemoryStore;
//! use enchantrack_core::tracker::{Notice, RenderFrame, Tracker, TrackerView};
//!
//! #[derive(Default)]
//! struct Count(usize);
//!
//! impl TrackerView for Count {
//!     fn render(&mut self, frame: RenderFrame<'_>) {
//!         self.0 = frame.visible.len();
//!     }
//!     fn notify(&mut self, _notice: Notice) {}
//! }
//!
//! let mut tracker = Tracker::new(MemoryStore::new(), Count::default());
//! let ticket = tracker.begin_catalog_load();
//! tracker.finish_catalog_load(
//!     ticket,
//!     "inline",
//!     CatalogSource::Text(
//!         r#"[{"name":"mending","max_level":1,"rarity_weight":2,"tradeable":true,"librarian_biomes":["any"]}]"#
//!             .to_string(),
//!     ),
//! );
//! assert_eq!(tracker.view().0, 1);
//! tracker.on_toggle("mending").unwrap();
//! assert_eq!(tracker.stats().percentage, 100);
//! ```

pub mod card;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod icons;
pub mod progress;
pub mod stats;
pub mod storage;
pub mod taxonomy;
pub mod tracker;

pub use card::{EnchantmentCard, FrameModel};
pub use catalog::{Catalog, CatalogSource, CatalogStore, EnchantmentRecord, LoadOutcome, LoadTicket};
pub use error::{CatalogError, Result, SnapshotError, StorageError, TrackerError};
pub use filter::{BiomeFilter, CollectionStatus, FilterCriteria, ItemTypeFilter, filter_catalog};
pub use progress::{Progress, ProgressEntry, ProgressSnapshot, ProgressStore};
pub use stats::{Stats, compute_stats};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use taxonomy::ItemTaxonomy;
pub use tracker::{Notice, NoticeLevel, RenderFrame, Tracker, TrackerView, ViewMode};
