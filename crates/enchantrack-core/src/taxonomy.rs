#![forbid(unsafe_code)]

//! Item taxonomy: concrete item identifiers rolled up into generic categories.
//!
//! Enchantments list the concrete items they apply to (`minecraft:diamond_sword`,
//! `minecraft:golden_sword`, ...). For display those collapse into one generic
//! entry per category (`sword`) with the concrete identifiers attached as
//! variants. Items with no configured category stand alone as their own
//! category.
//!
//! Classification is substring based: the bare item name is tested against
//! the configured category keys from longest to shortest, so `pickaxe` wins
//! over `axe` and `crossbow` over `bow`.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use serde::Serialize;

/// Category assigned to every mob head and skull.
pub const HEAD_CATEGORY: &str = "head";

/// Category returned for identifiers with an empty bare name.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Static display configuration for one generic item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemGroup {
    pub key: &'static str,
    pub label: &'static str,
    /// Representative icon, relative to the icon asset root.
    pub icon: &'static str,
}

impl ItemGroup {
    const fn new(key: &'static str, label: &'static str, icon: &'static str) -> Self {
        Self { key, label, icon }
    }
}

/// Built-in category table.
pub const ITEM_GROUPS: &[ItemGroup] = &[
    ItemGroup::new("sword", "Sword", "diamond_sword.png"),
    ItemGroup::new("pickaxe", "Pickaxe", "diamond_pickaxe.png"),
    ItemGroup::new("axe", "Axe", "diamond_axe.png"),
    ItemGroup::new("shovel", "Shovel", "diamond_shovel.png"),
    ItemGroup::new("hoe", "Hoe", "diamond_hoe.png"),
    ItemGroup::new("helmet", "Helmet", "diamond_helmet.png"),
    ItemGroup::new("chestplate", "Chestplate", "diamond_chestplate.png"),
    ItemGroup::new("leggings", "Leggings", "diamond_leggings.png"),
    ItemGroup::new("boots", "Boots", "diamond_boots.png"),
    ItemGroup::new("bow", "Bow", "bow.png"),
    ItemGroup::new("crossbow", "Crossbow", "crossbow_standby.png"),
    ItemGroup::new("trident", "Trident", "trident.png"),
    ItemGroup::new("mace", "Mace", "mace.png"),
    ItemGroup::new("fishing_rod", "Fishing Rod", "fishing_rod.png"),
    ItemGroup::new("shears", "Shears", "shears.png"),
    ItemGroup::new("flint_and_steel", "Flint and Steel", "flint_and_steel.png"),
    ItemGroup::new("carrot_on_a_stick", "Carrot on a Stick", "carrot_on_a_stick.png"),
    ItemGroup::new(
        "warped_fungus_on_a_stick",
        "Warped Fungus on a Stick",
        "warped_fungus_on_a_stick.png",
    ),
    ItemGroup::new("shield", "Shield", "shield.png"),
    ItemGroup::new("elytra", "Elytra", "elytra.png"),
    ItemGroup::new("brush", "Brush", "brush.png"),
    ItemGroup::new("compass", "Compass", "compass_00.png"),
    ItemGroup::new(HEAD_CATEGORY, "Mob Head", "heads/head.png"),
];

static STANDARD: LazyLock<ItemTaxonomy> = LazyLock::new(|| ItemTaxonomy::new(ITEM_GROUPS));

/// One display row produced by [`ItemTaxonomy::group_items`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemGroupEntry {
    pub category: String,
    pub is_generic: bool,
    /// Member identifiers in input order. Empty for standalone entries.
    pub variants: Vec<String>,
    /// The single identifier behind a standalone entry.
    pub standalone: Option<String>,
}

impl ItemGroupEntry {
    /// Every input identifier this entry accounts for.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.standalone
            .as_deref()
            .into_iter()
            .chain(self.variants.iter().map(String::as_str))
    }
}

/// Category matcher over a configurable set of [`ItemGroup`]s.
#[derive(Debug, Clone)]
pub struct ItemTaxonomy {
    groups: Vec<ItemGroup>,
    /// Keys ordered longest first, ties alphabetical.
    match_order: Vec<&'static str>,
}

impl ItemTaxonomy {
    #[must_use]
    pub fn new(groups: &[ItemGroup]) -> Self {
        let mut match_order: Vec<&'static str> = groups.iter().map(|group| group.key).collect();
        match_order.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        match_order.dedup();
        Self {
            groups: groups.to_vec(),
            match_order,
        }
    }

    /// The built-in taxonomy over [`ITEM_GROUPS`].
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    #[must_use]
    pub fn group(&self, key: &str) -> Option<&ItemGroup> {
        self.groups.iter().find(|group| group.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().map(|group| group.key)
    }

    /// Classify one identifier. Never fails and never returns an empty key.
    #[must_use]
    pub fn base_category(&self, item_id: &str) -> String {
        let bare = bare_name(item_id);
        if bare.is_empty() {
            return UNKNOWN_CATEGORY.to_string();
        }
        if is_head(bare) {
            return HEAD_CATEGORY.to_string();
        }
        self.match_order
            .iter()
            .find(|key| bare.contains(**key))
            .map_or_else(|| bare.to_string(), |key| (*key).to_string())
    }

    /// Roll identifiers up into generic entries with variants, followed by
    /// standalone entries.
    ///
    /// A category becomes generic as soon as one member's bare name differs
    /// from the key (or two distinct identifiers share it); the plain item,
    /// if present, is then listed among the variants instead of standing alone.
    #[must_use]
    pub fn group_items<S: AsRef<str>>(&self, item_ids: &[S]) -> Vec<ItemGroupEntry> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order: Vec<String> = Vec::new();
        let mut members: HashMap<String, Vec<&str>> = HashMap::new();
        let mut has_variant: HashSet<String> = HashSet::new();

        for id in item_ids.iter().map(AsRef::as_ref) {
            if !seen.insert(id) {
                continue;
            }
            let category = self.base_category(id);
            if bare_name(id) != category {
                has_variant.insert(category.clone());
            }
            if !members.contains_key(&category) {
                order.push(category.clone());
            }
            members.entry(category).or_default().push(id);
        }

        let is_generic = |category: &str, list: &[&str]| -> bool {
            has_variant.contains(category) || list.len() > 1
        };

        let mut entries = Vec::with_capacity(order.len());
        for category in &order {
            let list = &members[category];
            if is_generic(category, list) {
                entries.push(ItemGroupEntry {
                    category: category.clone(),
                    is_generic: true,
                    variants: list.iter().map(|id| (*id).to_string()).collect(),
                    standalone: None,
                });
            }
        }
        for category in &order {
            let list = &members[category];
            if !is_generic(category, list) {
                entries.push(ItemGroupEntry {
                    category: category.clone(),
                    is_generic: false,
                    variants: Vec::new(),
                    standalone: list.first().map(|id| (*id).to_string()),
                });
            }
        }
        entries
    }

    /// Display label for a category; standalone categories are title-cased.
    #[must_use]
    pub fn label(&self, key: &str) -> String {
        match self.group(key) {
            Some(group) => group.label.to_string(),
            None => title_case(key),
        }
    }
}

/// Strip the `namespace:` prefix. Identifiers without one are already bare.
#[must_use]
pub fn bare_name(item_id: &str) -> &str {
    item_id
        .split_once(':')
        .map_or(item_id, |(_, bare)| bare)
}

#[must_use]
pub fn is_head(bare: &str) -> bool {
    bare == "head" || bare == "skull" || bare.ends_with("_head") || bare.ends_with("_skull")
}

/// [`ItemTaxonomy::base_category`] on the built-in taxonomy.
#[must_use]
pub fn base_category(item_id: &str) -> String {
    ItemTaxonomy::standard().base_category(item_id)
}

/// [`ItemTaxonomy::group_items`] on the built-in taxonomy.
#[must_use]
pub fn group_items<S: AsRef<str>>(item_ids: &[S]) -> Vec<ItemGroupEntry> {
    ItemTaxonomy::standard().group_items(item_ids)
}

/// `warped_fungus_on_a_stick` -> `Warped Fungus On A Stick`.
#[must_use]
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_is_stripped() {
        assert_eq!(bare_name("minecraft:diamond_sword"), "diamond_sword");
        assert_eq!(bare_name("diamond_sword"), "diamond_sword");
        assert_eq!(bare_name("mod:ns:thing"), "ns:thing");
    }

    #[test]
    fn longer_keys_win_over_substrings() {
        assert_eq!(base_category("minecraft:netherite_pickaxe"), "pickaxe");
        assert_eq!(base_category("minecraft:iron_axe"), "axe");
        assert_eq!(base_category("minecraft:crossbow"), "crossbow");
        assert_eq!(base_category("minecraft:bow"), "bow");
    }

    #[test]
    fn heads_and_skulls_share_one_category() {
        for id in [
            "minecraft:zombie_head",
            "minecraft:skeleton_skull",
            "minecraft:wither_skeleton_skull",
            "head",
            "skull",
        ] {
            assert_eq!(base_category(id), HEAD_CATEGORY, "{id}");
        }
    }

    #[test]
    fn unknown_items_are_their_own_category() {
        assert_eq!(base_category("minecraft:carved_pumpkin"), "carved_pumpkin");
        assert_eq!(base_category("minecraft:book"), "book");
    }

    #[test]
    fn empty_bare_name_maps_to_unknown() {
        assert_eq!(base_category(""), UNKNOWN_CATEGORY);
        assert_eq!(base_category("minecraft:"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn swords_roll_up_and_bow_stands_alone() {
        let entries = group_items(&[
            "minecraft:diamond_sword",
            "minecraft:wooden_sword",
            "minecraft:bow",
        ]);
        assert_eq!(
            entries,
            vec![
                ItemGroupEntry {
                    category: "sword".to_string(),
                    is_generic: true,
                    variants: vec![
                        "minecraft:diamond_sword".to_string(),
                        "minecraft:wooden_sword".to_string(),
                    ],
                    standalone: None,
                },
                ItemGroupEntry {
                    category: "bow".to_string(),
                    is_generic: false,
                    variants: Vec::new(),
                    standalone: Some("minecraft:bow".to_string()),
                },
            ]
        );
    }

    #[test]
    fn plain_generic_item_is_suppressed_when_variants_exist() {
        let entries = group_items(&["minecraft:compass", "minecraft:recovery_compass"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "compass");
        assert!(entries[0].is_generic);
        assert_eq!(
            entries[0].variants,
            vec!["minecraft:compass", "minecraft:recovery_compass"]
        );
    }

    #[test]
    fn generic_entries_precede_standalone_entries() {
        let entries = group_items(&[
            "minecraft:elytra",
            "minecraft:iron_boots",
            "minecraft:carved_pumpkin",
            "minecraft:golden_boots",
        ]);
        let categories: Vec<&str> = entries.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, vec!["boots", "elytra", "carved_pumpkin"]);
    }

    #[test]
    fn duplicates_are_emitted_once() {
        let entries = group_items(&["minecraft:bow", "minecraft:bow"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].standalone.as_deref(), Some("minecraft:bow"));
    }

    #[test]
    fn custom_taxonomy_matches_only_its_keys() {
        let taxonomy = ItemTaxonomy::new(&[ItemGroup::new("rod", "Rod", "rod.png")]);
        assert_eq!(taxonomy.base_category("minecraft:fishing_rod"), "rod");
        assert_eq!(taxonomy.base_category("minecraft:iron_sword"), "iron_sword");
    }

    #[test]
    fn labels_fall_back_to_title_case() {
        let taxonomy = ItemTaxonomy::standard();
        assert_eq!(taxonomy.label("fishing_rod"), "Fishing Rod");
        assert_eq!(taxonomy.label("carved_pumpkin"), "Carved Pumpkin");
    }
}
