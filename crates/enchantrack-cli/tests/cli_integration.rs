use std::fs;
use std::path::Path;

use clap::Parser;
use enchantrack_cli::{Cli, CliError, execute};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

const CATALOG: &str = r#"[
    {
        "name": "sharpness",
        "description": "Sharpness",
        "max_level": 5,
        "min_cost": 1,
        "max_cost": 21,
        "rarity_weight": 10,
        "applies_to": ["minecraft:diamond_sword", "minecraft:iron_axe"],
        "librarian_biomes": ["plains"],
        "tradeable": true
    },
    {
        "name": "mending",
        "description": "Mending",
        "max_level": 1,
        "rarity_weight": 2,
        "applies_to": ["minecraft:elytra"],
        "librarian_biomes": ["any"],
        "tradeable": true
    },
    {
        "name": "soul_speed",
        "description": "Soul Speed",
        "max_level": 3,
        "rarity_weight": 1,
        "applies_to": ["minecraft:diamond_boots"],
        "tradeable": false
    }
]"#;

struct Workspace {
    dir: TempDir,
}

struct Output {
    result: Result<(), CliError>,
    stdout: String,
    stderr: String,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().expect("tempdir");
        let catalogs = dir.path().join("enchantments");
        fs::create_dir_all(&catalogs).expect("catalog dir");
        fs::write(catalogs.join("java_1.21.10.json"), CATALOG).expect("catalog");
        fs::write(catalogs.join("java_1.21.json"), "[]").expect("older catalog");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let catalog_dir = self.path().join("enchantments");
        let state = self.path().join("state.json");
        let mut argv = vec![
            "enchantrack".to_string(),
            "--catalog-dir".to_string(),
            catalog_dir.display().to_string(),
            "--state".to_string(),
            state.display().to_string(),
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_string()));
        let cli = Cli::try_parse_from(argv).expect("parse");

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let result = execute(cli, &mut stdout, &mut stderr, &mut input.as_bytes());
        Output {
            result,
            stdout: String::from_utf8(stdout).expect("utf8"),
            stderr: String::from_utf8(stderr).expect("utf8"),
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_with_input(args, "")
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if let Err(error) = output.result {
            panic!("{args:?} failed: {error}");
        }
        output.stdout
    }
}

#[test]
fn toggle_persists_between_invocations() {
    let ws = Workspace::new();
    assert_eq!(ws.ok(&["toggle", "mending"]), "mending: collected\n");
    assert_eq!(ws.ok(&["stats"]), "1/2 tradeable enchantments collected (50%)\n");

    let state: Value =
        serde_json::from_str(&fs::read_to_string(ws.path().join("state.json")).expect("state"))
            .expect("state json");
    let progress: Value =
        serde_json::from_str(state["enchantrack.progress"].as_str().expect("progress key"))
            .expect("snapshot");
    assert_eq!(progress["version"], 2);
    assert_eq!(progress["enchantments"]["mending"]["complete"], true);
    assert!(progress["lastUpdated"].is_string());
}

#[test]
fn list_applies_filters_in_catalog_order() {
    let ws = Workspace::new();
    let text = ws.ok(&["list", "--view", "list"]);
    let rows: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].contains("Sharpness"));
    assert!(rows[2].contains("not tradeable"));

    let text = ws.ok(&["list", "--view", "list", "--biome", "plains", "--item-type", "sword"]);
    assert!(text.contains("Sharpness"));
    assert!(!text.contains("Mending"));

    let text = ws.ok(&["list", "--biome", "desert"]);
    assert!(text.ends_with("No enchantments match the current filters.\n"));
}

#[test]
fn list_json_carries_cards_and_stats() {
    let ws = Workspace::new();
    ws.ok(&["toggle", "sharpness"]);
    let json: Value = serde_json::from_str(&ws.ok(&["--json", "list", "--status", "collected"]))
        .expect("frame json");
    assert_eq!(json["stats"]["collected"], 1);
    assert_eq!(json["cards"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["cards"][0]["name"], "sharpness");
    assert_eq!(json["criteria"]["collectionStatus"], "collected");
}

#[test]
fn toggle_level_rejects_levels_beyond_max() {
    let ws = Workspace::new();
    assert_eq!(
        ws.ok(&["toggle-level", "sharpness", "2"]),
        "sharpness level 2: checked (1 checked)\n"
    );
    let output = ws.run(&["toggle-level", "sharpness", "6"]);
    let error = output.result.expect_err("level 6 is out of range");
    assert_eq!(error.exit_code(), 2);
    assert!(output.stderr.is_empty());
}

#[test]
fn unknown_names_need_explicit_opt_in() {
    let ws = Workspace::new();
    let error = ws.run(&["toggle", "sharpnes"]).result.expect_err("typo");
    assert!(matches!(error, CliError::UnknownEnchantment { .. }));
    assert_eq!(ws.ok(&["toggle", "sharpnes", "--allow-unknown"]), "sharpnes: collected\n");
}

#[test]
fn export_import_round_trip() {
    let ws = Workspace::new();
    ws.ok(&["toggle", "sharpness"]);
    ws.ok(&["toggle-level", "sharpness", "1"]);
    let export_path = ws.path().join("backup.json");
    ws.ok(&["export", "--output", export_path.to_str().expect("utf8 path")]);

    ws.ok(&["clear", "--yes"]);
    assert_eq!(ws.ok(&["stats"]), "0/2 tradeable enchantments collected (0%)\n");

    let output = ws.run(&["import", export_path.to_str().expect("utf8 path")]);
    assert!(output.result.is_ok());
    assert_eq!(output.stderr, "Imported progress for 1 enchantments\n");
    assert_eq!(ws.ok(&["stats"]), "1/2 tradeable enchantments collected (50%)\n");
}

#[test]
fn import_from_stdin_accepts_snapshot_without_version() {
    let ws = Workspace::new();
    let snapshot = r#"{"enchantments":{"sharpness":{"complete":true,"levels":{"1":true}}}}"#;
    let output = ws.run_with_input(&["import", "-"], snapshot);
    assert!(output.result.is_ok());

    let json: Value = serde_json::from_str(&ws.ok(&["--json", "show", "sharpness"])).expect("card");
    assert_eq!(json["complete"], true);
    assert_eq!(json["checked_levels"], 1);
}

#[test]
fn malformed_import_fails_and_keeps_progress() {
    let ws = Workspace::new();
    ws.ok(&["toggle", "mending"]);
    let output = ws.run_with_input(&["import", "-"], "[1, 2]");
    assert!(output.result.is_err());
    assert_eq!(ws.ok(&["stats"]), "1/2 tradeable enchantments collected (50%)\n");
}

#[test]
fn clear_requires_confirmation() {
    let ws = Workspace::new();
    let error = ws.run(&["clear"]).result.expect_err("needs --yes");
    assert_eq!(error.exit_code(), 2);
}

#[test]
fn view_mode_is_remembered() {
    let ws = Workspace::new();
    assert_eq!(ws.ok(&["view"]), "card\n");
    assert_eq!(ws.ok(&["view", "list"]), "list\n");
    assert_eq!(ws.ok(&["view"]), "list\n");
}

#[test]
fn options_and_versions_describe_catalogs() {
    let ws = Workspace::new();
    let json: Value = serde_json::from_str(&ws.ok(&["--json", "options"])).expect("options");
    assert_eq!(json["biomes"], serde_json::json!(["any", "plains"]));
    assert_eq!(json["item_types"], serde_json::json!(["sword", "axe", "elytra", "boots"]));

    assert_eq!(ws.ok(&["versions"]), "  java_1.21\n* java_1.21.10\n");
}

#[test]
fn missing_catalog_version_lists_nothing() {
    let ws = Workspace::new();
    assert_eq!(
        ws.ok(&["--game-version", "1.8", "stats"]),
        "0/0 tradeable enchantments collected (0%)\n"
    );
}

#[test]
fn malformed_catalog_is_an_error() {
    let ws = Workspace::new();
    fs::write(ws.path().join("enchantments").join("java_broken.json"), "{").expect("write");
    let output = ws.run(&["--game-version", "broken", "stats"]);
    assert!(output.result.is_err());
}

#[test]
fn missing_icon_assets_resolve_to_placeholder() {
    let ws = Workspace::new();
    let icons = ws.path().join("icons");
    fs::create_dir_all(&icons).expect("icon dir");
    for asset in ["barrier.png", "book.png", "diamond_sword.png"] {
        fs::write(icons.join(asset), b"png").expect("icon");
    }
    let root = icons.display().to_string();

    let card: Value =
        serde_json::from_str(&ws.ok(&["--json", "--icon-root", &root, "show", "sharpness"]))
            .expect("card json");
    assert_eq!(card["icon"], format!("{root}/book.png"));
    assert_eq!(card["items"][0]["category"], "sword");
    assert_eq!(card["items"][0]["icon"], format!("{root}/diamond_sword.png"));
    assert_eq!(card["items"][1]["category"], "axe");
    assert_eq!(card["items"][1]["icon"], format!("{root}/barrier.png"));
    assert_eq!(card["items"][1]["variants"][0]["icon"], format!("{root}/barrier.png"));

    let frame: Value =
        serde_json::from_str(&ws.ok(&["--json", "--icon-root", &root, "list", "--search", "mending"]))
            .expect("frame json");
    assert_eq!(frame["placeholder_icon"], format!("{root}/barrier.png"));
    assert_eq!(frame["cards"][0]["items"][0]["icon"], format!("{root}/barrier.png"));
}
