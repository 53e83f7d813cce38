use std::io::{self, Read, Write};

use clap::{Parser, Subcommand};

use crate::commands::{
    ClearArgs, ExportArgs, ImportArgs, ListArgs, ShowArgs, ToggleArgs, ToggleLevelArgs, ViewArgs,
    run_clear, run_export, run_import, run_list, run_options, run_show, run_stats, run_toggle,
    run_toggle_level, run_versions, run_view,
};
use crate::config::{Config, GlobalArgs};
use crate::error::Result;
use crate::logging;
use crate::session::Session;

#[derive(Debug, Parser)]
#[command(
    name = "enchantrack",
    about = "Track which librarian enchanted books you have collected",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show enchantments matching the given filters.
    List(ListArgs),

    /// Show one enchantment with its levels and items.
    Show(ShowArgs),

    /// Flip the collected flag of an enchantment.
    Toggle(ToggleArgs),

    /// Flip one level of an enchantment.
    #[command(name = "toggle-level")]
    ToggleLevel(ToggleLevelArgs),

    /// Print collection statistics.
    Stats,

    /// Write a progress snapshot.
    Export(ExportArgs),

    /// Replace progress with a snapshot.
    Import(ImportArgs),

    /// Erase all progress.
    Clear(ClearArgs),

    /// Print or set the list layout.
    View(ViewArgs),

    /// Print the filter values available in the loaded catalog.
    Options,

    /// List catalog versions in the catalog directory.
    Versions,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    execute(cli, &mut stdout.lock(), &mut stderr.lock(), &mut io::stdin())
}

/// Run one command against explicit streams. Notices raised by the tracker
/// go to `err` when the command succeeds; on failure the returned error
/// carries the message instead.
pub fn execute(
    cli: Cli,
    out: &mut dyn Write,
    err: &mut dyn Write,
    input: &mut dyn Read,
) -> Result<()> {
    let Cli { global, command } = cli;
    if let Commands::Versions = command {
        return run_versions(&global, out);
    }

    let mut session = Session::open(Config::resolve(&global))?;
    match &command {
        Commands::List(args) => run_list(&mut session, args, out),
        Commands::Show(args) => run_show(&session, args, out),
        Commands::Toggle(args) => run_toggle(&mut session, args, out),
        Commands::ToggleLevel(args) => run_toggle_level(&mut session, args, out),
        Commands::Stats => run_stats(&session, out),
        Commands::Export(args) => run_export(&session, args, out),
        Commands::Import(args) => run_import(&mut session, args, input),
        Commands::Clear(args) => run_clear(&mut session, args, out),
        Commands::View(args) => run_view(&mut session, args, out),
        Commands::Options => run_options(&session, out),
        Commands::Versions => run_versions(&global, out),
    }?;
    session.flush_notices(err)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};
    use crate::config::DEFAULT_GAME_VERSION;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "enchantrack",
            "list",
            "--biome",
            "plains",
            "--status",
            "missing",
            "--json",
            "-vv",
        ])
        .expect("parse");
        assert!(cli.global.json);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.game_version, DEFAULT_GAME_VERSION);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.criteria().biome.to_string(), "plains");
                assert_eq!(args.criteria().collection_status.to_string(), "missing");
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn bad_status_is_a_parse_error() {
        assert!(Cli::try_parse_from(["enchantrack", "list", "--status", "owned"]).is_err());
    }

    #[test]
    fn toggle_level_takes_name_and_level() {
        let cli = Cli::try_parse_from(["enchantrack", "toggle-level", "sharpness", "3"]).expect("parse");
        match cli.command {
            Commands::ToggleLevel(args) => {
                assert_eq!(args.name, "sharpness");
                assert_eq!(args.level, 3);
                assert!(!args.allow_unknown);
            }
            other => panic!("expected toggle-level, got {other:?}"),
        }
    }

    #[test]
    fn view_mode_argument_is_typed() {
        assert!(Cli::try_parse_from(["enchantrack", "view", "grid"]).is_err());
        assert!(Cli::try_parse_from(["enchantrack", "view", "list"]).is_ok());
    }
}
