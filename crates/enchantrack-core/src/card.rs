//! Display-ready projection of one enchantment.
//!
//! Cards join a catalog record with its progress entry, its grouped item
//! list and resolved icon paths. Hosts render cards; they never reach back
//! into the stores.

use serde::Serialize;

use crate::catalog::EnchantmentRecord;
use crate::filter::FilterCriteria;
use crate::icons::{BOOK_ICON, IconResolver, category_icon, item_icon};
use crate::progress::Progress;
use crate::stats::Stats;
use crate::taxonomy::{ItemTaxonomy, bare_name};
use crate::tracker::{RenderFrame, ViewMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelState {
    pub level: u32,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantCard {
    pub id: String,
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCard {
    pub category: String,
    pub label: String,
    pub icon: String,
    pub is_generic: bool,
    pub variants: Vec<VariantCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnchantmentCard {
    pub name: String,
    pub title: String,
    pub icon: String,
    pub max_level: u32,
    pub max_level_label: String,
    pub rarity_weight: f64,
    pub min_cost: i64,
    pub max_cost: i64,
    pub tradeable: bool,
    pub librarian_biomes: Vec<String>,
    pub complete: bool,
    pub checked_levels: usize,
    pub levels: Vec<LevelState>,
    pub items: Vec<ItemCard>,
}

impl EnchantmentCard {
    #[must_use]
    pub fn build(
        record: &EnchantmentRecord,
        progress: &Progress,
        taxonomy: &ItemTaxonomy,
        icons: &IconResolver,
    ) -> Self {
        let entry = progress.get(&record.name);
        let levels = (1..=record.max_level)
            .map(|level| LevelState {
                level,
                label: level_label(level),
                checked: entry.is_some_and(|entry| entry.is_level_checked(level)),
            })
            .collect();

        let items = taxonomy
            .group_items(&record.applies_to)
            .into_iter()
            .map(|group| {
                let icon = match group.standalone.as_deref() {
                    Some(id) => item_icon(id),
                    None => category_icon(taxonomy, &group.category),
                };
                ItemCard {
                    label: taxonomy.label(&group.category),
                    icon: icons.resolve(&icon),
                    is_generic: group.is_generic,
                    variants: group
                        .variants
                        .iter()
                        .map(|id| VariantCard {
                            id: id.clone(),
                            label: taxonomy.label(bare_name(id)),
                            icon: icons.resolve(&item_icon(id)),
                        })
                        .collect(),
                    category: group.category,
                }
            })
            .collect();

        Self {
            name: record.name.clone(),
            title: record.display_name().to_string(),
            icon: icons.resolve(BOOK_ICON),
            max_level: record.max_level,
            max_level_label: level_label(record.max_level),
            rarity_weight: record.rarity_weight,
            min_cost: record.min_cost,
            max_cost: record.max_cost,
            tradeable: record.tradeable,
            librarian_biomes: record.librarian_biomes.clone(),
            complete: progress.is_complete(&record.name),
            checked_levels: progress.checked_level_count(&record.name),
            levels,
            items,
        }
    }
}

/// Owned, serializable form of a [`RenderFrame`] with every visible record
/// projected to a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameModel {
    pub catalog: Option<String>,
    /// What the page shows in place of an icon that failed to load.
    pub placeholder_icon: String,
    pub view_mode: ViewMode,
    pub criteria: FilterCriteria,
    pub stats: Stats,
    pub cards: Vec<EnchantmentCard>,
}

impl FrameModel {
    #[must_use]
    pub fn build(frame: &RenderFrame<'_>, taxonomy: &ItemTaxonomy, icons: &IconResolver) -> Self {
        Self {
            catalog: frame.catalog_label.map(str::to_string),
            placeholder_icon: icons.placeholder(),
            view_mode: frame.view_mode,
            criteria: frame.criteria.clone(),
            stats: frame.stats,
            cards: frame
                .visible
                .iter()
                .map(|record| EnchantmentCard::build(record, frame.progress, taxonomy, icons))
                .collect(),
        }
    }
}

/// Roman numeral as shown in game tooltips; `0` renders as `0`.
#[must_use]
pub fn level_label(level: u32) -> String {
    const NUMERALS: &[(u32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if level == 0 {
        return "0".to_string();
    }
    let mut remaining = level;
    let mut label = String::new();
    for &(value, numeral) in NUMERALS {
        while remaining >= value {
            label.push_str(numeral);
            remaining -= value;
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::tradeable;

    #[test]
    fn roman_numerals() {
        assert_eq!(level_label(1), "I");
        assert_eq!(level_label(4), "IV");
        assert_eq!(level_label(5), "V");
        assert_eq!(level_label(10), "X");
        assert_eq!(level_label(255), "CCLV");
        assert_eq!(level_label(0), "0");
    }

    #[test]
    fn card_groups_items_and_resolves_icons() {
        let record = tradeable(
            "unbreaking",
            3,
            &["plains"],
            &[
                "minecraft:iron_sword",
                "minecraft:golden_sword",
                "minecraft:crossbow",
            ],
        );
        let mut progress = Progress::new();
        progress.toggle_level("unbreaking", 2, Some(3));

        let card = EnchantmentCard::build(
            &record,
            &progress,
            ItemTaxonomy::standard(),
            &IconResolver::new("icons"),
        );

        assert_eq!(card.icon, "icons/book.png");
        assert_eq!(card.max_level_label, "III");
        assert_eq!(card.checked_levels, 1);
        assert!(!card.complete);
        assert_eq!(
            card.levels.iter().map(|level| level.checked).collect::<Vec<_>>(),
            vec![false, true, false]
        );

        assert_eq!(card.items.len(), 2);
        let sword = &card.items[0];
        assert_eq!(sword.category, "sword");
        assert_eq!(sword.icon, "icons/diamond_sword.png");
        assert_eq!(sword.variants[0].icon, "icons/iron_sword.png");
        assert_eq!(sword.variants[1].label, "Golden Sword");

        let crossbow = &card.items[1];
        assert!(!crossbow.is_generic);
        assert_eq!(crossbow.icon, "icons/crossbow_standby.png");
    }

    #[test]
    fn missing_assets_fall_back_to_placeholder() {
        let record = tradeable(
            "sharpness",
            5,
            &["plains"],
            &["minecraft:iron_sword", "minecraft:totally_unknown_thing"],
        );
        let icons = IconResolver::new("icons").with_asset_check(|path| {
            matches!(path, "icons/book.png" | "icons/diamond_sword.png")
        });

        let card = EnchantmentCard::build(&record, &Progress::new(), ItemTaxonomy::standard(), &icons);

        assert_eq!(card.icon, "icons/book.png");
        assert_eq!(card.items[0].icon, "icons/diamond_sword.png");
        assert_eq!(card.items[0].variants[0].icon, "icons/barrier.png");
        assert_eq!(card.items[1].category, "totally_unknown_thing");
        assert_eq!(card.items[1].icon, "icons/barrier.png");
    }

    #[test]
    fn frame_model_serializes_cards_in_frame_order() {
        let records = [
            tradeable("mending", 1, &["any"], &["minecraft:elytra"]),
            tradeable("infinity", 1, &["desert"], &["minecraft:bow"]),
        ];
        let progress = Progress::new();
        let criteria = FilterCriteria::default();
        let frame = RenderFrame {
            visible: records.iter().collect(),
            progress: &progress,
            stats: Stats {
                collected: 0,
                total: 2,
                percentage: 0,
            },
            criteria: &criteria,
            view_mode: ViewMode::List,
            catalog_label: Some("java_1.21.10"),
        };

        let model = FrameModel::build(&frame, ItemTaxonomy::standard(), &IconResolver::default());
        let json = serde_json::to_value(&model).expect("frame json");
        assert_eq!(json["view_mode"], "list");
        assert_eq!(json["catalog"], "java_1.21.10");
        assert_eq!(json["placeholder_icon"], "item_icons/barrier.png");
        assert_eq!(json["cards"][1]["name"], "infinity");
        assert_eq!(json["cards"][0]["items"][0]["icon"], "item_icons/elytra.png");
        assert_eq!(json["criteria"]["biome"], "all");
    }
}
