use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Args;
use enchantrack_core::card::EnchantmentCard;
use enchantrack_core::error::TrackerError;
use enchantrack_core::filter::{BiomeFilter, CollectionStatus, FilterCriteria, ItemTypeFilter};
use enchantrack_core::tracker::{RenderFrame, ViewMode};
use serde_json::json;

use crate::config::{GlobalArgs, list_versions, version_stem};
use crate::error::{CliError, Result};
use crate::session::Session;
use crate::view::{format_card, render_frame};

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// `all`, `tradeable`, or a village biome such as `plains`.
    #[arg(long, default_value = "all")]
    pub biome: BiomeFilter,

    /// `all`, `collected`, or `missing`.
    #[arg(long, default_value = "all")]
    pub status: CollectionStatus,

    /// `all` or an item category key such as `sword`.
    #[arg(long = "item-type", default_value = "all")]
    pub item_type: ItemTypeFilter,

    /// Case-insensitive match against name and description.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Render in this mode without changing the stored one.
    #[arg(long)]
    pub view: Option<ViewMode>,
}

impl ListArgs {
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            biome: self.biome.clone(),
            collection_status: self.status,
            item_type: self.item_type.clone(),
            search_text: self.search.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    pub name: String,
}

#[derive(Debug, Clone, Args)]
pub struct ToggleArgs {
    pub name: String,

    /// Track names that are not in the loaded catalog.
    #[arg(long)]
    pub allow_unknown: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ToggleLevelArgs {
    pub name: String,
    pub level: u32,

    /// Track names that are not in the loaded catalog.
    #[arg(long)]
    pub allow_unknown: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    /// Write the snapshot here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Snapshot file, or `-` for stdin.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ClearArgs {
    /// Confirm that all progress should be erased.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// `card` or `list`. Prints the current mode when omitted.
    pub mode: Option<ViewMode>,
}

pub fn run_list(session: &mut Session, args: &ListArgs, out: &mut dyn Write) -> Result<()> {
    let tracker = session.tracker_mut();
    tracker.on_filter_change(args.criteria());
    let rendered = match args.view {
        Some(mode) if mode != tracker.view_mode() => {
            let view = tracker.view();
            let frame = RenderFrame {
                visible: tracker.visible(),
                progress: tracker.progress(),
                stats: tracker.stats(),
                criteria: tracker.criteria(),
                view_mode: mode,
                catalog_label: tracker.catalog_label(),
            };
            render_frame(view.json(), &frame, view.taxonomy(), view.icons())
        }
        _ => tracker.view().rendered().unwrap_or_default().to_string(),
    };
    write!(out, "{rendered}")?;
    if !rendered.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

pub fn run_show(session: &Session, args: &ShowArgs, out: &mut dyn Write) -> Result<()> {
    let record = session
        .catalog()
        .get(&args.name)
        .ok_or_else(|| CliError::UnknownEnchantment {
            name: args.name.clone(),
        })?;
    let view = session.tracker().view();
    let card = EnchantmentCard::build(
        record,
        session.tracker().progress(),
        view.taxonomy(),
        view.icons(),
    );
    if session.config().json {
        writeln!(out, "{}", serde_json::to_string_pretty(&card)?)?;
    } else {
        write!(out, "{}", format_card(&card))?;
    }
    Ok(())
}

pub fn run_toggle(session: &mut Session, args: &ToggleArgs, out: &mut dyn Write) -> Result<()> {
    session.check_name(&args.name, args.allow_unknown)?;
    let complete = session.tracker_mut().on_toggle(&args.name)?;
    if session.config().json {
        writeln!(out, "{}", json!({ "name": args.name, "complete": complete }))?;
    } else {
        let state = if complete { "collected" } else { "missing" };
        writeln!(out, "{}: {state}", args.name)?;
    }
    Ok(())
}

pub fn run_toggle_level(
    session: &mut Session,
    args: &ToggleLevelArgs,
    out: &mut dyn Write,
) -> Result<()> {
    session.check_name(&args.name, args.allow_unknown)?;
    let checked = session
        .tracker_mut()
        .on_toggle_level(&args.name, args.level)?;
    let count = session.tracker().progress().checked_level_count(&args.name);
    if session.config().json {
        writeln!(
            out,
            "{}",
            json!({
                "name": args.name,
                "level": args.level,
                "checked": checked,
                "checked_levels": count,
            })
        )?;
    } else {
        let state = if checked { "checked" } else { "unchecked" };
        writeln!(out, "{} level {}: {state} ({count} checked)", args.name, args.level)?;
    }
    Ok(())
}

pub fn run_stats(session: &Session, out: &mut dyn Write) -> Result<()> {
    let stats = session.tracker().stats();
    if session.config().json {
        writeln!(out, "{}", serde_json::to_string(&stats)?)?;
    } else {
        writeln!(
            out,
            "{}/{} tradeable enchantments collected ({}%)",
            stats.collected, stats.total, stats.percentage
        )?;
    }
    Ok(())
}

pub fn run_export(session: &Session, args: &ExportArgs, out: &mut dyn Write) -> Result<()> {
    let snapshot = session.tracker().export();
    let text = snapshot.to_json_pretty().map_err(TrackerError::from)?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))?;
            tracing::info!(
                target: "enchantrack.cli",
                path = %path.display(),
                entries = snapshot.enchantments.len(),
                "progress exported"
            );
            if !session.config().json {
                writeln!(
                    out,
                    "Exported progress for {} enchantments to {}",
                    snapshot.enchantments.len(),
                    path.display()
                )?;
            }
        }
        None => writeln!(out, "{text}")?,
    }
    Ok(())
}

pub fn run_import(session: &mut Session, args: &ImportArgs, input: &mut dyn Read) -> Result<()> {
    let text = if args.path.as_os_str() == "-" {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(&args.path)?
    };
    session.tracker_mut().import(&text)?;
    Ok(())
}

pub fn run_clear(session: &mut Session, args: &ClearArgs, out: &mut dyn Write) -> Result<()> {
    if !args.yes {
        return Err(CliError::invalid("refusing to clear progress without --yes"));
    }
    session.tracker_mut().clear_all()?;
    if !session.config().json {
        writeln!(out, "All progress cleared")?;
    }
    Ok(())
}

pub fn run_view(session: &mut Session, args: &ViewArgs, out: &mut dyn Write) -> Result<()> {
    if let Some(mode) = args.mode {
        session.tracker_mut().set_view_mode(mode)?;
    }
    let mode = session.tracker().view_mode();
    if session.config().json {
        writeln!(out, "{}", json!({ "view_mode": mode }))?;
    } else {
        writeln!(out, "{mode}")?;
    }
    Ok(())
}

/// Values accepted by the `list` filters for the loaded catalog.
pub fn run_options(session: &Session, out: &mut dyn Write) -> Result<()> {
    let catalog = session.catalog();
    let biomes = catalog.biomes();
    let item_types = catalog.item_categories(session.tracker().view().taxonomy());
    if session.config().json {
        writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(&json!({
                "biomes": biomes,
                "collection_statuses": ["all", "collected", "missing"],
                "item_types": item_types,
            }))?
        )?;
    } else {
        writeln!(out, "biomes: all, tradeable, {}", biomes.join(", "))?;
        writeln!(out, "statuses: all, collected, missing")?;
        writeln!(out, "item types: all, {}", item_types.join(", "))?;
    }
    Ok(())
}

pub fn run_versions(global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
    let versions = list_versions(&global.catalog_dir)?;
    let current = version_stem(&global.game_version);
    if global.json {
        writeln!(out, "{}", json!({ "current": current, "versions": versions }))?;
        return Ok(());
    }
    if versions.is_empty() {
        writeln!(out, "no catalogs in {}", global.catalog_dir.display())?;
    }
    for version in &versions {
        let marker = if *version == current { "*" } else { " " };
        writeln!(out, "{marker} {version}")?;
    }
    Ok(())
}
