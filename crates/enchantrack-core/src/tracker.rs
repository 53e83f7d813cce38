//! The coordinating context for one tracker session.
//!
//! [`Tracker`] owns every piece of mutable session state (catalog store,
//! progress store, filter criteria, view mode) and drives a host-supplied
//! [`TrackerView`]. Hosts call the `on_*` handlers in response to user
//! input; each handler mutates, persists, and re-renders before returning.
//!
//! Everything runs on the caller's thread. The only asynchronous step a host
//! has is fetching catalog text, which is bracketed by
//! [`Tracker::begin_catalog_load`] and [`Tracker::finish_catalog_load`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogSource, CatalogStore, EnchantmentRecord, LoadOutcome, LoadTicket};
use crate::error::{Result, TrackerError};
use crate::filter::{FilterCriteria, filter_catalog};
use crate::progress::{Progress, ProgressSnapshot, ProgressStore};
use crate::stats::{Stats, compute_stats};
use crate::storage::{KeyValueStore, VIEW_MODE_KEY};

/// Layout the host uses for the visible subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Card,
    List,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = TrackerError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim() {
            "card" => Ok(Self::Card),
            "list" => Ok(Self::List),
            other => Err(TrackerError::UnknownViewMode(other.to_string())),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible message raised by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub visible: Vec<&'a EnchantmentRecord>,
    pub progress: &'a Progress,
    pub stats: Stats,
    pub criteria: &'a FilterCriteria,
    pub view_mode: ViewMode,
    pub catalog_label: Option<&'a str>,
}

/// Presentation adapter injected into the [`Tracker`].
pub trait TrackerView {
    fn render(&mut self, frame: RenderFrame<'_>);
    fn notify(&mut self, notice: Notice);
}

/// Session state plus the view it drives.
#[derive(Debug)]
pub struct Tracker<S, V> {
    catalog: CatalogStore,
    progress: ProgressStore<S>,
    criteria: FilterCriteria,
    view_mode: ViewMode,
    view: V,
}

impl<S: KeyValueStore, V: TrackerView> Tracker<S, V> {
    /// Restore progress and view mode from `store`. Starts with an empty
    /// catalog and default criteria.
    pub fn new(store: S, view: V) -> Self {
        let view_mode = match store.get(VIEW_MODE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(target: "enchantrack.tracker", raw = %raw, "unknown persisted view mode");
                ViewMode::default()
            }),
            Ok(None) => ViewMode::default(),
            Err(error) => {
                tracing::warn!(target: "enchantrack.tracker", error = %error, "view mode unreadable");
                ViewMode::default()
            }
        };
        Self {
            catalog: CatalogStore::new(),
            progress: ProgressStore::load(store),
            criteria: FilterCriteria::default(),
            view_mode,
            view,
        }
    }

    /// Install an already-parsed catalog without going through a load ticket.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = CatalogStore::with_catalog(catalog);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.catalog.catalog()
    }

    #[must_use]
    pub fn catalog_label(&self) -> Option<&str> {
        self.catalog.label()
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        self.progress.progress()
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn store(&self) -> &S {
        self.progress.store()
    }

    /// Give back the store and the view.
    pub fn into_parts(self) -> (S, V) {
        (self.progress.into_store(), self.view)
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&EnchantmentRecord> {
        filter_catalog(self.catalog.catalog(), self.progress.progress(), &self.criteria)
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        compute_stats(self.catalog.catalog(), self.progress.progress())
    }

    /// Recompute the visible subset and hand it to the view.
    pub fn refresh(&mut self) {
        let catalog = self.catalog.catalog();
        let progress = self.progress.progress();
        let frame = RenderFrame {
            visible: filter_catalog(catalog, progress, &self.criteria),
            progress,
            stats: compute_stats(catalog, progress),
            criteria: &self.criteria,
            view_mode: self.view_mode,
            catalog_label: self.catalog.label(),
        };
        tracing::trace!(
            target: "enchantrack.tracker",
            visible = frame.visible.len(),
            collected = frame.stats.collected,
            total = frame.stats.total,
            "render"
        );
        self.view.render(frame);
    }

    pub fn on_filter_change(&mut self, criteria: FilterCriteria) {
        tracing::debug!(
            target: "enchantrack.tracker",
            biome = %criteria.biome,
            status = %criteria.collection_status,
            item_type = %criteria.item_type,
            search = %criteria.search_text,
            "filter changed"
        );
        self.criteria = criteria;
        self.refresh();
    }

    /// Flip the completion flag of `name`. Unknown names get a default entry.
    pub fn on_toggle(&mut self, name: &str) -> Result<bool> {
        let result = self.progress.toggle_complete(self.catalog.catalog(), name);
        self.settle(result)
    }

    /// Flip one level of `name`. Levels outside `1..=max_level` are rejected
    /// for names the catalog knows.
    pub fn on_toggle_level(&mut self, name: &str, level: u32) -> Result<bool> {
        if let Some(max_level) = self.catalog.catalog().max_level(name) {
            if level == 0 || level > max_level {
                let error = TrackerError::LevelOutOfRange {
                    name: name.to_string(),
                    level,
                    max_level,
                };
                self.view.notify(Notice::error(error.to_string()));
                return Err(error);
            }
        }
        let result = self
            .progress
            .toggle_level(self.catalog.catalog(), name, level);
        self.settle(result)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<()> {
        self.view_mode = mode;
        let result = self
            .progress
            .store_mut()
            .set(VIEW_MODE_KEY, mode.as_str())
            .map_err(TrackerError::from);
        self.settle(result)
    }

    /// Replace progress with an imported snapshot document.
    pub fn import(&mut self, text: &str) -> Result<usize> {
        match self.progress.import(text) {
            Ok(entries) => {
                self.view
                    .notify(Notice::info(format!("Imported progress for {entries} enchantments")));
                self.refresh();
                Ok(entries)
            }
            Err(error) => {
                self.view
                    .notify(Notice::error(format!("Import failed: {error}")));
                self.refresh();
                Err(error)
            }
        }
    }

    #[must_use]
    pub fn export(&self) -> ProgressSnapshot {
        self.progress.export()
    }

    pub fn clear_all(&mut self) -> Result<()> {
        let result = self.progress.clear_all();
        self.settle(result)
    }

    /// Register a catalog request; responses for older tickets are dropped.
    pub fn begin_catalog_load(&mut self) -> LoadTicket {
        self.catalog.begin_load()
    }

    /// Apply a catalog response. A rejected document keeps the previous
    /// catalog and raises one error notice.
    pub fn finish_catalog_load(
        &mut self,
        ticket: LoadTicket,
        label: impl Into<String>,
        source: CatalogSource,
    ) -> LoadOutcome {
        let label = label.into();
        let outcome = self.catalog.finish_load(ticket, label.clone(), source);
        match &outcome {
            LoadOutcome::Loaded { .. } | LoadOutcome::Missing => self.refresh(),
            LoadOutcome::Rejected(error) => {
                self.view.notify(Notice::error(format!(
                    "Could not load catalog {label}: {error}"
                )));
            }
            LoadOutcome::Stale { .. } => {}
        }
        outcome
    }

    /// Report a transport failure for `ticket`. Stale failures are silent.
    /// Returns whether a notice was raised.
    pub fn fail_catalog_load(&mut self, ticket: LoadTicket, label: &str, reason: &str) -> bool {
        if !self.catalog.is_current(ticket) {
            return false;
        }
        tracing::warn!(
            target: "enchantrack.catalog",
            source = %label,
            reason = %reason,
            "catalog fetch failed, keeping previous catalog"
        );
        self.view
            .notify(Notice::error(format!("Could not load catalog {label}: {reason}")));
        true
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.view
                .notify(Notice::error(format!("Could not save progress: {error}")));
        }
        self.refresh();
        result
    }
}
