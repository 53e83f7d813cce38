//! Terminal adapter for the tracker's render contract.
//!
//! [`TerminalView`] keeps the most recent frame as text (or JSON with
//! `--json`) and queues notices; commands decide what reaches stdout.

use std::fmt::Write as _;

use enchantrack_core::card::{EnchantmentCard, FrameModel, ItemCard};
use enchantrack_core::icons::IconResolver;
use enchantrack_core::taxonomy::ItemTaxonomy;
use enchantrack_core::tracker::{Notice, NoticeLevel, RenderFrame, TrackerView, ViewMode};

#[derive(Debug)]
pub struct TerminalView {
    json: bool,
    taxonomy: &'static ItemTaxonomy,
    icons: IconResolver,
    rendered: Option<String>,
    notices: Vec<Notice>,
}

impl TerminalView {
    #[must_use]
    pub fn new(json: bool, icons: IconResolver) -> Self {
        Self {
            json,
            taxonomy: ItemTaxonomy::standard(),
            icons,
            rendered: None,
            notices: Vec::new(),
        }
    }

    /// Output of the last render, if any happened.
    #[must_use]
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[must_use]
    pub fn json(&self) -> bool {
        self.json
    }

    #[must_use]
    pub fn taxonomy(&self) -> &'static ItemTaxonomy {
        self.taxonomy
    }

    #[must_use]
    pub fn icons(&self) -> &IconResolver {
        &self.icons
    }
}

impl TrackerView for TerminalView {
    fn render(&mut self, frame: RenderFrame<'_>) {
        self.rendered = Some(render_frame(self.json, &frame, self.taxonomy, &self.icons));
    }

    fn notify(&mut self, notice: Notice) {
        tracing::debug!(target: "enchantrack.cli", level = ?notice.level, message = %notice.message, "notice");
        self.notices.push(notice);
    }
}

/// Frame as pretty JSON or as text in the frame's view mode.
#[must_use]
pub fn render_frame(
    json: bool,
    frame: &RenderFrame<'_>,
    taxonomy: &ItemTaxonomy,
    icons: &IconResolver,
) -> String {
    if json {
        let model = FrameModel::build(frame, taxonomy, icons);
        serde_json::to_string_pretty(&model).unwrap_or_else(|_| "{}".to_string())
    } else {
        format_frame(frame, taxonomy, icons)
    }
}

#[must_use]
pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => notice.message.clone(),
        NoticeLevel::Error => format!("error: {}", notice.message),
    }
}

/// Plain-text rendering of one frame in its view mode.
#[must_use]
pub fn format_frame(frame: &RenderFrame<'_>, taxonomy: &ItemTaxonomy, icons: &IconResolver) -> String {
    let mut out = String::new();
    let label = frame.catalog_label.unwrap_or("no catalog");
    let _ = writeln!(
        out,
        "{label}: {}/{} tradeable collected ({}%)",
        frame.stats.collected, frame.stats.total, frame.stats.percentage
    );
    if !frame.criteria.is_default() {
        let _ = writeln!(
            out,
            "filters: biome={} status={} item={} search={:?}",
            frame.criteria.biome,
            frame.criteria.collection_status,
            frame.criteria.item_type,
            frame.criteria.search_text
        );
    }
    if frame.visible.is_empty() {
        out.push_str("No enchantments match the current filters.\n");
        return out;
    }

    for record in &frame.visible {
        let card = EnchantmentCard::build(record, frame.progress, taxonomy, icons);
        match frame.view_mode {
            ViewMode::List => out.push_str(&format_row(&card)),
            ViewMode::Card => out.push_str(&format_card(&card)),
        }
    }
    out
}

fn status_mark(card: &EnchantmentCard) -> &'static str {
    if card.complete {
        "[x]"
    } else if card.checked_levels > 0 {
        "[~]"
    } else {
        "[ ]"
    }
}

fn biome_summary(card: &EnchantmentCard) -> String {
    if !card.tradeable {
        "not tradeable".to_string()
    } else if card.librarian_biomes.is_empty() {
        "no librarian biome".to_string()
    } else {
        card.librarian_biomes.join(", ")
    }
}

/// One line per enchantment.
#[must_use]
pub fn format_row(card: &EnchantmentCard) -> String {
    format!(
        "{} {:<24} {:<5} {}/{} levels  {}\n",
        status_mark(card),
        card.title,
        card.max_level_label,
        card.checked_levels,
        card.max_level,
        biome_summary(card)
    )
}

fn format_items(items: &[ItemCard]) -> String {
    items
        .iter()
        .map(|item| {
            if item.variants.is_empty() {
                item.label.clone()
            } else {
                let variants: Vec<&str> = item.variants.iter().map(|variant| variant.label.as_str()).collect();
                format!("{} ({})", item.label, variants.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Multi-line block per enchantment.
#[must_use]
pub fn format_card(card: &EnchantmentCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} ({})", status_mark(card), card.title, card.name);
    let _ = writeln!(
        out,
        "    max {}, weight {}, cost {}-{}",
        card.max_level_label, card.rarity_weight, card.min_cost, card.max_cost
    );
    let _ = writeln!(out, "    librarians: {}", biome_summary(card));
    let levels: Vec<String> = card
        .levels
        .iter()
        .map(|level| format!("[{}] {}", if level.checked { "x" } else { " " }, level.label))
        .collect();
    let _ = writeln!(out, "    levels: {}", levels.join("  "));
    if !card.items.is_empty() {
        let _ = writeln!(out, "    items: {}", format_items(&card.items));
    }
    out
}
