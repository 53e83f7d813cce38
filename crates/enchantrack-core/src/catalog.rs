#![forbid(unsafe_code)]

//! Enchantment catalog: typed records, validation, and the load lifecycle.
//!
//! A catalog is a JSON array of [`EnchantmentRecord`]s produced by the
//! extraction tooling, one file per game version. Parsing validates the
//! whole document up front; a rejected document never replaces the
//! catalog already in memory.
//!
//! Loads are modeled as ticketed requests so a host that issues several
//! loads in a row (rapid version switching) can discard late responses for
//! superseded requests.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::taxonomy::{ItemTaxonomy, bare_name};

/// Biome sentinel for enchantments tradeable in every village.
pub const ANY_BIOME: &str = "any";

/// Highest `max_level` a record may declare; the game stores levels in a byte.
pub const MAX_LEVEL_LIMIT: u32 = 255;

/// Village biomes with their own librarian trade pools.
pub const VILLAGE_BIOMES: &[&str] = &[
    "desert", "jungle", "plains", "savanna", "snow", "swamp", "taiga",
];

/// One enchantment as shipped in the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnchantmentRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_level: u32,
    pub rarity_weight: f64,
    #[serde(default)]
    pub min_cost: i64,
    #[serde(default)]
    pub max_cost: i64,
    #[serde(default)]
    pub tradeable: bool,
    #[serde(default)]
    pub librarian_biomes: Vec<String>,
    #[serde(default)]
    pub applies_to: Vec<String>,
}

impl EnchantmentRecord {
    /// Description, or the name when the catalog left it blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        }
    }

    #[must_use]
    pub fn offered_in(&self, biome: &str) -> bool {
        self.librarian_biomes.iter().any(|candidate| candidate == biome)
    }

    fn validate(&self, index: usize) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName { index });
        }
        if self.max_level == 0 {
            return Err(CatalogError::ZeroMaxLevel {
                name: self.name.clone(),
            });
        }
        if self.max_level > MAX_LEVEL_LIMIT {
            return Err(CatalogError::MaxLevelTooHigh {
                name: self.name.clone(),
                max_level: self.max_level,
                limit: MAX_LEVEL_LIMIT,
            });
        }
        if !self.rarity_weight.is_finite() || self.rarity_weight <= 0.0 {
            return Err(CatalogError::InvalidWeight {
                name: self.name.clone(),
                weight: self.rarity_weight,
            });
        }
        Ok(())
    }
}

/// Ordered, name-indexed list of records for one game version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<EnchantmentRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already-typed records, enforcing the same rules
    /// as [`parse_catalog`].
    pub fn from_records(records: Vec<EnchantmentRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            record.validate(position)?;
            if index.insert(record.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateName {
                    index: position,
                    name: record.name.clone(),
                });
            }
        }
        Ok(Self { records, index })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[EnchantmentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnchantmentRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EnchantmentRecord> {
        self.index.get(name).map(|&position| &self.records[position])
    }

    #[must_use]
    pub fn max_level(&self, name: &str) -> Option<u32> {
        self.get(name).map(|record| record.max_level)
    }

    /// Distinct librarian biomes across tradeable records, sorted.
    #[must_use]
    pub fn biomes(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| record.tradeable)
            .flat_map(|record| record.librarian_biomes.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct bare item names any enchantment applies to, sorted.
    #[must_use]
    pub fn enchantable_items(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|record| record.applies_to.iter())
            .map(|item| bare_name(item).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct item categories in first-seen catalog order.
    #[must_use]
    pub fn item_categories(&self, taxonomy: &ItemTaxonomy) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|record| record.applies_to.iter())
            .map(|item| taxonomy.base_category(item))
            .filter(|category| seen.insert(category.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a EnchantmentRecord;
    type IntoIter = std::slice::Iter<'a, EnchantmentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parse and validate a catalog document.
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    let records: Vec<EnchantmentRecord> = serde_json::from_str(text)?;
    Catalog::from_records(records)
}

/// Identifies one catalog load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What a host managed to read for a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The catalog file does not exist.
    Missing,
    /// Raw catalog document.
    Text(String),
}

/// Result of completing a load request.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The catalog was replaced; carries the new record count.
    Loaded { records: usize },
    /// The source was absent; the catalog is now empty.
    Missing,
    /// A newer request was issued after this one; nothing changed.
    Stale { ticket: LoadTicket, latest: LoadTicket },
    /// The document was rejected; the previous catalog is kept.
    Rejected(CatalogError),
}

impl LoadOutcome {
    #[must_use]
    pub fn changed_catalog(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Missing)
    }
}

/// Holds the current catalog and arbitrates overlapping loads.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    catalog: Catalog,
    latest: u64,
    label: Option<String>,
}

impl CatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Label of the source the current catalog came from, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Register a new load request. Any earlier outstanding ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    #[must_use]
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Apply the response for `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        label: impl Into<String>,
        source: CatalogSource,
    ) -> LoadOutcome {
        let label = label.into();
        if !self.is_current(ticket) {
            tracing::debug!(
                target: "enchantrack.catalog",
                ticket = ticket.0,
                latest = self.latest,
                source = %label,
                "discarding stale catalog response"
            );
            return LoadOutcome::Stale {
                ticket,
                latest: LoadTicket(self.latest),
            };
        }

        match source {
            CatalogSource::Missing => {
                tracing::info!(
                    target: "enchantrack.catalog",
                    source = %label,
                    "catalog source missing, using empty catalog"
                );
                self.catalog = Catalog::empty();
                self.label = Some(label);
                LoadOutcome::Missing
            }
            CatalogSource::Text(text) => match parse_catalog(&text) {
                Ok(catalog) => {
                    let records = catalog.len();
                    tracing::info!(
                        target: "enchantrack.catalog",
                        source = %label,
                        records,
                        "catalog loaded"
                    );
                    self.catalog = catalog;
                    self.label = Some(label);
                    LoadOutcome::Loaded { records }
                }
                Err(error) => {
                    tracing::warn!(
                        target: "enchantrack.catalog",
                        source = %label,
                        error = %error,
                        "catalog rejected, keeping previous catalog"
                    );
                    LoadOutcome::Rejected(error)
                }
            },
        }
    }
}
