use std::io::Write;
use std::path::Path;

use enchantrack_core::catalog::{Catalog, LoadOutcome};
use enchantrack_core::error::TrackerError;
use enchantrack_core::icons::IconResolver;
use enchantrack_core::storage::FileStore;
use enchantrack_core::tracker::Tracker;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::view::{TerminalView, format_notice};

fn asset_exists(path: &str) -> bool {
    Path::new(path).is_file()
}

/// One command invocation: the state file, the catalog and the terminal view.
#[derive(Debug)]
pub struct Session {
    config: Config,
    tracker: Tracker<FileStore, TerminalView>,
}

impl Session {
    /// Open the state file and load the configured catalog. A malformed
    /// catalog is an error here; a missing one yields an empty catalog.
    pub fn open(config: Config) -> Result<Self> {
        let store = FileStore::open(config.state_path.clone())?;
        let icons = IconResolver::new(config.icon_root.clone()).with_asset_check(asset_exists);
        let view = TerminalView::new(config.json, icons);
        let mut tracker = Tracker::new(store, view);

        let ticket = tracker.begin_catalog_load();
        let source = config.read_catalog()?;
        if let LoadOutcome::Rejected(error) =
            tracker.finish_catalog_load(ticket, config.catalog_label.clone(), source)
        {
            return Err(CliError::Tracker(TrackerError::Catalog(error)));
        }
        tracing::debug!(
            target: "enchantrack.cli",
            catalog = %config.catalog_path.display(),
            state = %config.state_path.display(),
            records = tracker.catalog().len(),
            "session opened"
        );
        Ok(Self { config, tracker })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.tracker.catalog()
    }

    #[must_use]
    pub fn tracker(&self) -> &Tracker<FileStore, TerminalView> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker<FileStore, TerminalView> {
        &mut self.tracker
    }

    /// Reject names the loaded catalog does not know, unless the catalog is
    /// empty or `allow_unknown` is set.
    pub fn check_name(&self, name: &str, allow_unknown: bool) -> Result<()> {
        let catalog = self.tracker.catalog();
        if allow_unknown || catalog.is_empty() || catalog.get(name).is_some() {
            Ok(())
        } else {
            Err(CliError::UnknownEnchantment {
                name: name.to_string(),
            })
        }
    }

    /// Write queued notices, one per line.
    pub fn flush_notices(&mut self, err: &mut dyn Write) -> Result<()> {
        for notice in self.tracker.view_mut().take_notices() {
            writeln!(err, "{}", format_notice(&notice))?;
        }
        Ok(())
    }
}
