#![forbid(unsafe_code)]

//! `enchantrack`: terminal front end for the enchanted-book tracker.
//!
//! Each invocation opens the JSON state file, loads one catalog version and
//! runs a single command against an `enchantrack_core::Tracker`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod view;

pub use cli::{Cli, Commands, execute, run, run_from_env};
pub use error::{CliError, Result};
