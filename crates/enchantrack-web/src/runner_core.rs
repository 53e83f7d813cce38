#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping `Tracker<S, FrameBuffer>`.
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here.

use enchantrack_core::card::FrameModel;
use enchantrack_core::catalog::{CatalogSource, LoadOutcome, LoadTicket};
use enchantrack_core::filter::FilterCriteria;
use enchantrack_core::icons::IconResolver;
use enchantrack_core::storage::KeyValueStore;
use enchantrack_core::taxonomy::ItemTaxonomy;
use enchantrack_core::tracker::{Notice, RenderFrame, Tracker, TrackerView, ViewMode};
use serde::Serialize;

/// View adapter that keeps the latest frame as an owned model.
#[derive(Debug)]
pub struct FrameBuffer {
    taxonomy: &'static ItemTaxonomy,
    icons: IconResolver,
    frame: Option<FrameModel>,
    notices: Vec<Notice>,
    /// Incremented on every render so the page can skip redundant redraws.
    generation: u64,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(icons: IconResolver) -> Self {
        Self {
            taxonomy: ItemTaxonomy::standard(),
            icons,
            frame: None,
            notices: Vec::new(),
            generation: 0,
        }
    }
}

impl TrackerView for FrameBuffer {
    fn render(&mut self, frame: RenderFrame<'_>) {
        self.frame = Some(FrameModel::build(&frame, self.taxonomy, &self.icons));
        self.generation += 1;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Dropdown values for the filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub biomes: Vec<String>,
    pub item_types: Vec<(String, String)>,
}

fn parse_criteria(
    biome: &str,
    status: &str,
    item_type: &str,
    search: &str,
) -> enchantrack_core::Result<FilterCriteria> {
    Ok(FilterCriteria {
        biome: biome.parse()?,
        collection_status: status.parse()?,
        item_type: item_type.parse()?,
        search_text: search.to_string(),
    })
}

/// Page-facing session over one tracker.
pub struct RunnerCore<S> {
    tracker: Tracker<S, FrameBuffer>,
}

impl<S: KeyValueStore> RunnerCore<S> {
    /// Restore persisted state and render the initial (empty-catalog) frame.
    pub fn new(store: S, icon_root: &str) -> Self {
        let mut tracker = Tracker::new(store, FrameBuffer::new(IconResolver::new(icon_root)));
        tracker.refresh();
        Self { tracker }
    }

    pub fn begin_catalog_load(&mut self) -> u64 {
        self.tracker.begin_catalog_load().get()
    }

    /// Complete a load. `text == None` means the file was not found.
    /// Returns `loaded`, `missing`, `stale` or `rejected`.
    pub fn finish_catalog_load(&mut self, ticket: u64, label: &str, text: Option<String>) -> &'static str {
        let source = text.map_or(CatalogSource::Missing, CatalogSource::Text);
        match self
            .tracker
            .finish_catalog_load(LoadTicket::new(ticket), label, source)
        {
            LoadOutcome::Loaded { .. } => "loaded",
            LoadOutcome::Missing => "missing",
            LoadOutcome::Stale { .. } => "stale",
            LoadOutcome::Rejected(_) => "rejected",
        }
    }

    pub fn fail_catalog_load(&mut self, ticket: u64, label: &str, reason: &str) -> bool {
        self.tracker
            .fail_catalog_load(LoadTicket::new(ticket), label, reason)
    }

    /// Apply filter strings as typed by the page. Rejected values leave the
    /// current criteria in place and queue an error notice.
    pub fn set_filter(&mut self, biome: &str, status: &str, item_type: &str, search: &str) -> bool {
        match parse_criteria(biome, status, item_type, search) {
            Ok(criteria) => {
                self.tracker.on_filter_change(criteria);
                true
            }
            Err(error) => {
                self.tracker.view_mut().notify(Notice::error(error.to_string()));
                false
            }
        }
    }

    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        self.tracker.on_toggle(name).ok()
    }

    pub fn toggle_level(&mut self, name: &str, level: u32) -> Option<bool> {
        self.tracker.on_toggle_level(name, level).ok()
    }

    pub fn set_view_mode(&mut self, mode: &str) -> bool {
        match mode.parse::<ViewMode>() {
            Ok(mode) => self.tracker.set_view_mode(mode).is_ok(),
            Err(error) => {
                self.tracker.view_mut().notify(Notice::error(error.to_string()));
                false
            }
        }
    }

    /// Pretty-printed export snapshot for download.
    pub fn export_progress(&mut self) -> Option<String> {
        match self.tracker.export().to_json_pretty() {
            Ok(text) => Some(text),
            Err(error) => {
                self.tracker
                    .view_mut()
                    .notify(Notice::error(format!("Export failed: {error}")));
                None
            }
        }
    }

    pub fn import_progress(&mut self, text: &str) -> bool {
        self.tracker.import(text).is_ok()
    }

    pub fn clear_all(&mut self) -> bool {
        self.tracker.clear_all().is_ok()
    }

    #[must_use]
    pub fn frame(&self) -> Option<&FrameModel> {
        self.tracker.view().frame.as_ref()
    }

    #[must_use]
    pub fn frame_generation(&self) -> u64 {
        self.tracker.view().generation
    }

    /// Latest frame as JSON, `null` before the first render.
    #[must_use]
    pub fn frame_json(&self) -> String {
        serde_json::to_string(&self.frame()).unwrap_or_else(|_| "null".to_string())
    }

    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        let catalog = self.tracker.catalog();
        let taxonomy = self.tracker.view().taxonomy;
        FilterOptions {
            biomes: catalog.biomes(),
            item_types: catalog
                .item_categories(taxonomy)
                .into_iter()
                .map(|key| {
                    let label = taxonomy.label(&key);
                    (key, label)
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn filter_options_json(&self) -> String {
        serde_json::to_string(&self.filter_options()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.tracker.view_mut().notices)
    }

    pub fn take_notices_json(&mut self) -> String {
        serde_json::to_string(&self.take_notices()).unwrap_or_else(|_| "[]".to_string())
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        self.tracker.store()
    }
}
