//! Visible-subset derivation over the catalog.
//!
//! [`filter_catalog`] is a pure projection: it never reorders or invents
//! records, so its output is always a subsequence of the catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::{Catalog, EnchantmentRecord};
use crate::error::TrackerError;
use crate::progress::Progress;

const ALL: &str = "all";
const TRADEABLE: &str = "tradeable";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum BiomeFilter {
    #[default]
    All,
    Tradeable,
    Biome(String),
}

impl BiomeFilter {
    #[must_use]
    pub fn matches(&self, record: &EnchantmentRecord) -> bool {
        match self {
            Self::All => true,
            Self::Tradeable => record.tradeable,
            Self::Biome(biome) => record.offered_in(biome),
        }
    }
}

impl FromStr for BiomeFilter {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Ok(match value {
            "" | ALL => Self::All,
            TRADEABLE => Self::Tradeable,
            biome => Self::Biome(biome.to_string()),
        })
    }
}

impl fmt::Display for BiomeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Tradeable => f.write_str(TRADEABLE),
            Self::Biome(biome) => f.write_str(biome),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CollectionStatus {
    #[default]
    All,
    Collected,
    Missing,
}

impl CollectionStatus {
    #[must_use]
    pub fn matches(self, complete: bool) -> bool {
        match self {
            Self::All => true,
            Self::Collected => complete,
            Self::Missing => !complete,
        }
    }
}

impl FromStr for CollectionStatus {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | ALL => Ok(Self::All),
            "collected" => Ok(Self::Collected),
            "missing" => Ok(Self::Missing),
            other => Err(TrackerError::UnknownFilter {
                kind: "collection status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => ALL,
            Self::Collected => "collected",
            Self::Missing => "missing",
        })
    }
}

/// Item-type filter. Matching is case-insensitive substring containment on
/// the raw `applies_to` identifiers, so `axe` also matches pickaxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ItemTypeFilter {
    #[default]
    All,
    Category(String),
}

impl ItemTypeFilter {
    #[must_use]
    pub fn matches(&self, record: &EnchantmentRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => {
                let needle = category.to_lowercase();
                record
                    .applies_to
                    .iter()
                    .any(|item| item.to_lowercase().contains(&needle))
            }
        }
    }
}

impl FromStr for ItemTypeFilter {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim() {
            "" | ALL => Self::All,
            category => Self::Category(category.to_string()),
        })
    }
}

impl fmt::Display for ItemTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Category(category) => f.write_str(category),
        }
    }
}

macro_rules! string_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    )+};
}

string_serde!(BiomeFilter, CollectionStatus, ItemTypeFilter);

/// User-selected filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub biome: BiomeFilter,
    pub collection_status: CollectionStatus,
    pub item_type: ItemTypeFilter,
    pub search_text: String,
}

impl FilterCriteria {
    #[must_use]
    pub fn matches(&self, record: &EnchantmentRecord, progress: &Progress) -> bool {
        self.biome.matches(record)
            && self
                .collection_status
                .matches(progress.is_complete(&record.name))
            && self.item_type.matches(record)
            && matches_search(record, &self.search_text)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

fn matches_search(record: &EnchantmentRecord, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let needle = search_text.to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || record.description.to_lowercase().contains(&needle)
}

/// Records passing every criterion, in catalog order.
#[must_use]
pub fn filter_catalog<'a>(
    catalog: &'a Catalog,
    progress: &Progress,
    criteria: &FilterCriteria,
) -> Vec<&'a EnchantmentRecord> {
    catalog
        .iter()
        .filter(|record| criteria.matches(record, progress))
        .collect()
}
