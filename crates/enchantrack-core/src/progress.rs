#![forbid(unsafe_code)]

//! Per-enchantment completion state and its persisted snapshot.
//!
//! [`Progress`] is the plain map; [`ProgressStore`] owns one together with a
//! [`KeyValueStore`] and writes the full snapshot after every mutation.
//! Entries are created lazily on first touch, sized from the catalog's
//! `max_level` (or a single level when the catalog does not know the name).

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Result, SnapshotError};
use crate::storage::{KeyValueStore, PROGRESS_KEY};

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressEntry {
    pub complete: bool,
    pub levels: BTreeMap<u32, bool>,
}

impl ProgressEntry {
    /// Fresh entry with levels `1..=max_level` unchecked.
    #[must_use]
    pub fn with_levels(max_level: u32) -> Self {
        Self {
            complete: false,
            levels: (1..=max_level).map(|level| (level, false)).collect(),
        }
    }

    #[must_use]
    pub fn has_any_level(&self) -> bool {
        self.levels.values().any(|checked| *checked)
    }

    #[must_use]
    pub fn checked_level_count(&self) -> usize {
        self.levels.values().filter(|checked| **checked).count()
    }

    #[must_use]
    pub fn is_level_checked(&self, level: u32) -> bool {
        self.levels.get(&level).copied().unwrap_or(false)
    }
}

/// Completion map keyed by enchantment name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress {
    entries: BTreeMap<String, ProgressEntry>,
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProgressEntry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProgressEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Create the entry for `name` if absent. Returns whether it was created.
    pub fn ensure_entry(&mut self, name: &str, max_level: Option<u32>) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(
            name.to_string(),
            ProgressEntry::with_levels(max_level.unwrap_or(1)),
        );
        true
    }

    pub fn toggle_complete(&mut self, name: &str, max_level: Option<u32>) -> bool {
        self.ensure_entry(name, max_level);
        let entry = self.entry_mut(name);
        entry.complete = !entry.complete;
        entry.complete
    }

    /// Flip one level flag; a level missing from the entry counts as unchecked.
    pub fn toggle_level(&mut self, name: &str, level: u32, max_level: Option<u32>) -> bool {
        self.ensure_entry(name, max_level);
        let flag = self.entry_mut(name).levels.entry(level).or_insert(false);
        *flag = !*flag;
        *flag
    }

    #[must_use]
    pub fn is_complete(&self, name: &str) -> bool {
        self.get(name).is_some_and(|entry| entry.complete)
    }

    #[must_use]
    pub fn has_any_level(&self, name: &str) -> bool {
        self.get(name).is_some_and(ProgressEntry::has_any_level)
    }

    #[must_use]
    pub fn checked_level_count(&self, name: &str) -> usize {
        self.get(name).map_or(0, ProgressEntry::checked_level_count)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry_mut(&mut self, name: &str) -> &mut ProgressEntry {
        self.entries.entry(name.to_string()).or_default()
    }
}

impl FromIterator<(String, ProgressEntry)> for Progress {
    fn from_iter<I: IntoIterator<Item = (String, ProgressEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Persisted and exported progress document.
///
/// Persisted snapshots carry `lastUpdated`; exports carry `exportDate`.
/// Imports accept either and ignore unknown top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default)]
    pub enchantments: Progress,
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
    #[serde(rename = "exportDate", default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
}

impl ProgressSnapshot {
    /// Decode a snapshot document. A missing or `null` `enchantments` field
    /// decodes as an empty map.
    pub fn parse(text: &str) -> std::result::Result<Self, SnapshotError> {
        let mut value: serde_json::Value = serde_json::from_str(text)?;
        let object = value.as_object_mut().ok_or(SnapshotError::NotAnObject)?;
        if object.get("enchantments").is_some_and(serde_json::Value::is_null) {
            object.remove("enchantments");
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> std::result::Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The timestamp the snapshot carries, whichever field it came in.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.last_updated
            .as_deref()
            .or(self.export_date.as_deref())
    }
}

/// ISO-8601 UTC timestamp with millisecond precision.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Progress map bound to its persistence backend.
#[derive(Debug)]
pub struct ProgressStore<S> {
    progress: Progress,
    store: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    /// Restore from the persisted key. Unreadable or malformed state starts
    /// empty; the failure is logged, not returned.
    pub fn load(store: S) -> Self {
        let progress = match store.get(PROGRESS_KEY) {
            Ok(Some(text)) => match ProgressSnapshot::parse(&text) {
                Ok(snapshot) => snapshot.enchantments,
                Err(error) => {
                    tracing::warn!(
                        target: "enchantrack.progress",
                        error = %error,
                        "persisted progress is malformed, starting empty"
                    );
                    Progress::new()
                }
            },
            Ok(None) => Progress::new(),
            Err(error) => {
                tracing::warn!(
                    target: "enchantrack.progress",
                    error = %error,
                    "persisted progress unreadable, starting empty"
                );
                Progress::new()
            }
        };
        tracing::debug!(
            target: "enchantrack.progress",
            entries = progress.len(),
            "progress restored"
        );
        Self { progress, store }
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Create the entry for `name` if absent, persisting only when created.
    pub fn ensure_entry(&mut self, catalog: &Catalog, name: &str) -> Result<&ProgressEntry> {
        if self.progress.ensure_entry(name, catalog.max_level(name)) {
            self.persist()?;
        }
        Ok(&*self.progress.entry_mut(name))
    }

    pub fn toggle_complete(&mut self, catalog: &Catalog, name: &str) -> Result<bool> {
        let complete = self.progress.toggle_complete(name, catalog.max_level(name));
        tracing::debug!(target: "enchantrack.progress", name, complete, "toggled complete");
        self.persist()?;
        Ok(complete)
    }

    /// Flip one level. No bounds check against the catalog happens here.
    pub fn toggle_level(&mut self, catalog: &Catalog, name: &str, level: u32) -> Result<bool> {
        let checked = self
            .progress
            .toggle_level(name, level, catalog.max_level(name));
        tracing::debug!(target: "enchantrack.progress", name, level, checked, "toggled level");
        self.persist()?;
        Ok(checked)
    }

    #[must_use]
    pub fn is_complete(&self, name: &str) -> bool {
        self.progress.is_complete(name)
    }

    #[must_use]
    pub fn has_any_level(&self, name: &str) -> bool {
        self.progress.has_any_level(name)
    }

    #[must_use]
    pub fn checked_level_count(&self, name: &str) -> usize {
        self.progress.checked_level_count(name)
    }

    /// Snapshot for persistence, stamped `lastUpdated`.
    #[must_use]
    pub fn serialize(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            version: Some(SNAPSHOT_VERSION),
            enchantments: self.progress.clone(),
            last_updated: Some(now_iso()),
            export_date: None,
        }
    }

    /// Snapshot for export, stamped `exportDate`.
    #[must_use]
    pub fn export(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            version: Some(SNAPSHOT_VERSION),
            enchantments: self.progress.clone(),
            last_updated: None,
            export_date: Some(now_iso()),
        }
    }

    /// Replace the in-memory map with the snapshot's entries.
    pub fn restore(&mut self, snapshot: ProgressSnapshot) {
        self.progress = snapshot.enchantments;
    }

    /// Decode `text`, replace the map, and persist. On a decode failure the
    /// current map is left untouched and the error is returned.
    pub fn import(&mut self, text: &str) -> Result<usize> {
        let snapshot = ProgressSnapshot::parse(text)?;
        self.restore(snapshot);
        let entries = self.progress.len();
        tracing::info!(target: "enchantrack.progress", entries, "progress imported");
        self.persist()?;
        Ok(entries)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.progress.clear();
        tracing::info!(target: "enchantrack.progress", "progress cleared");
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let text = self.serialize().to_json()?;
        self.store.set(PROGRESS_KEY, &text)?;
        Ok(())
    }
}
