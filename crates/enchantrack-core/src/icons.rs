//! Deterministic icon paths for categories and concrete items.
//!
//! Paths are relative to the icon asset root produced by the extraction
//! tooling. A resolver with an asset check substitutes [`PLACEHOLDER_ICON`]
//! for paths the check rejects; without one, the host substitutes it when a
//! path fails to load.

use crate::taxonomy::{ItemTaxonomy, bare_name, is_head};

/// Shipped unconditionally; stands in for any icon that fails to load.
pub const PLACEHOLDER_ICON: &str = "barrier.png";

/// Shipped unconditionally; used for the enchanted book itself.
pub const BOOK_ICON: &str = "book.png";

/// Icon for heads without a dedicated entry in [`HEAD_ICONS`].
pub const GENERIC_HEAD_ICON: &str = "heads/head.png";

/// Items whose in-game texture file is not named after the item.
const TEXTURE_OVERRIDES: &[(&str, &str)] = &[
    ("crossbow", "crossbow_standby"),
    ("compass", "compass_00"),
    ("clock", "clock_00"),
];

/// Heads have no item texture in the game archive; these ship separately.
const HEAD_ICONS: &[(&str, &str)] = &[
    ("creeper_head", "heads/creeper.png"),
    ("dragon_head", "heads/dragon.png"),
    ("piglin_head", "heads/piglin.png"),
    ("player_head", "heads/player.png"),
    ("skeleton_skull", "heads/skeleton.png"),
    ("wither_skeleton_skull", "heads/wither_skeleton.png"),
    ("zombie_head", "heads/zombie.png"),
];

/// Texture file stem for a bare item name.
#[must_use]
pub fn texture_name(bare: &str) -> &str {
    TEXTURE_OVERRIDES
        .iter()
        .find(|(item, _)| *item == bare)
        .map_or(bare, |(_, texture)| *texture)
}

/// Icon for one concrete item, used when variants are displayed.
#[must_use]
pub fn item_icon(item_id: &str) -> String {
    let bare = bare_name(item_id);
    if is_head(bare) {
        return HEAD_ICONS
            .iter()
            .find(|(head, _)| *head == bare)
            .map_or(GENERIC_HEAD_ICON, |(_, icon)| *icon)
            .to_string();
    }
    format!("{}.png", texture_name(bare))
}

/// Representative icon for a category key.
///
/// Configured categories use their table icon; standalone categories are
/// named after the item itself.
#[must_use]
pub fn category_icon(taxonomy: &ItemTaxonomy, key: &str) -> String {
    match taxonomy.group(key) {
        Some(group) => group.icon.to_string(),
        None => item_icon(key),
    }
}

/// Joins resolved icon paths onto an asset root and applies the
/// placeholder fallback.
#[derive(Debug, Clone)]
pub struct IconResolver {
    root: String,
    asset_check: Option<fn(&str) -> bool>,
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new("item_icons")
    }
}

impl IconResolver {
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        let mut root = root.into();
        while root.ends_with('/') {
            root.pop();
        }
        Self {
            root,
            asset_check: None,
        }
    }

    /// Check every resolved path with `exists` and fall back to the
    /// placeholder when it fails.
    #[must_use]
    pub fn with_asset_check(mut self, exists: fn(&str) -> bool) -> Self {
        self.asset_check = Some(exists);
        self
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn path(&self, icon: &str) -> String {
        if self.root.is_empty() {
            icon.to_string()
        } else {
            format!("{}/{icon}", self.root)
        }
    }

    #[must_use]
    pub fn placeholder(&self) -> String {
        self.path(PLACEHOLDER_ICON)
    }

    /// Resolve `icon` under the root, falling back to the placeholder when
    /// `exists` rejects the resolved path.
    pub fn resolve_or_placeholder(&self, icon: &str, exists: impl Fn(&str) -> bool) -> String {
        let path = self.path(icon);
        if exists(&path) {
            path
        } else {
            tracing::trace!(target: "enchantrack.icons", path = %path, "icon missing, using placeholder");
            self.placeholder()
        }
    }

    /// Path for `icon` under the root, checked when an asset check is set.
    #[must_use]
    pub fn resolve(&self, icon: &str) -> String {
        match self.asset_check {
            Some(exists) => self.resolve_or_placeholder(icon, exists),
            None => self.path(icon),
        }
    }
}
