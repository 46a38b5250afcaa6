//! Command-line interface for tasktogo
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::backup;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::i18n::I18nService;
use crate::output::OutputOptions;
use crate::repository::{IntegrityMode, Repository};

mod category;
mod data;
mod priority;
mod task;

pub use category::CategoryCommands;
pub use data::{ExportArgs, ImportArgs, ResetArgs, ThemeArgs};
pub use priority::PriorityCommands;
pub use task::TaskCommands;

/// tasktogo - local-first task management
///
/// Tasks with categories, priorities, due dates and image attachments,
/// persisted as JSON collections in a local data directory, with snapshot
/// export/import.
#[derive(Parser, Debug)]
#[command(name = "tasktogo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "TASKTOGO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true, env = "TASKTOGO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Priority management
    #[command(subcommand)]
    Priority(PriorityCommands),

    /// Show task statistics
    Stats,

    /// Export a snapshot of all data
    Export(ExportArgs),

    /// Import a snapshot, overwriting the collections it contains
    Import(ImportArgs),

    /// Write the backup slot now
    Backup,

    /// Remove all data (except the theme) and reseed defaults
    Reset(ResetArgs),

    /// Show or set the theme preference
    Theme(ThemeArgs),
}

/// Shared state for command implementations
pub(crate) struct AppContext {
    pub repo: Repository,
    pub i18n: I18nService,
    pub options: OutputOptions,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let data_dir = config.resolve_data_dir(self.data_dir.clone())?;
        let repo = Repository::open(&data_dir)?;

        // Startup integrity sweep, per configured mode. Repairs are
        // reported, never silent.
        let report = repo.check_integrity(config.integrity.mode);
        if report.orphaned_tasks > 0 && !self.quiet {
            match config.integrity.mode {
                IntegrityMode::Repair => eprintln!(
                    "warning: repaired {} orphaned task(s)",
                    report.repaired_tasks
                ),
                IntegrityMode::Warn => eprintln!(
                    "warning: found {} orphaned task(s); run with integrity mode `repair` to fix",
                    report.orphaned_tasks
                ),
                IntegrityMode::Off => {}
            }
        }

        let ctx = AppContext {
            repo,
            i18n: I18nService::load(&config.language),
            options: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        };

        let mutating = self.command.is_mutating();
        let result = match self.command {
            Commands::Task(cmd) => task::run(&ctx, cmd),
            Commands::Category(cmd) => category::run(&ctx, cmd),
            Commands::Priority(cmd) => priority::run(&ctx, cmd),
            Commands::Stats => data::run_stats(&ctx),
            Commands::Export(args) => data::run_export(&ctx, args),
            Commands::Import(args) => data::run_import(&ctx, args),
            Commands::Backup => data::run_backup(&ctx),
            Commands::Reset(args) => data::run_reset(&ctx, args),
            Commands::Theme(args) => data::run_theme(&ctx, args),
        };

        // Opportunistic backup after successful mutations; failures are
        // logged inside and never affect the command outcome.
        if result.is_ok() && mutating && config.backup.enabled {
            backup::maybe_backup(&ctx.repo, config.backup.interval());
        }

        result
    }
}

impl Commands {
    fn is_mutating(&self) -> bool {
        match self {
            Commands::Task(cmd) => !matches!(cmd, TaskCommands::List(_) | TaskCommands::Show(_)),
            Commands::Category(cmd) => !matches!(cmd, CategoryCommands::List),
            Commands::Priority(cmd) => !matches!(cmd, PriorityCommands::List),
            Commands::Import(_) | Commands::Reset(_) => true,
            Commands::Theme(args) => args.value.is_some(),
            Commands::Stats | Commands::Export(_) | Commands::Backup => false,
        }
    }
}

/// Resolve a category by id or case-insensitive name
pub(crate) fn resolve_category(
    repo: &Repository,
    reference: &str,
) -> Result<crate::model::Category> {
    repo.categories()
        .into_iter()
        .find(|c| c.id == reference || c.name.eq_ignore_ascii_case(reference))
        .ok_or_else(|| Error::CategoryNotFound(reference.to_string()))
}

/// Resolve a priority by id or case-insensitive name
pub(crate) fn resolve_priority(
    repo: &Repository,
    reference: &str,
) -> Result<crate::model::Priority> {
    repo.priorities()
        .into_iter()
        .find(|p| p.id == reference || p.name.eq_ignore_ascii_case(reference))
        .ok_or_else(|| Error::PriorityNotFound(reference.to_string()))
}
