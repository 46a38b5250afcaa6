//! Data-level commands: stats, export, import, backup, reset, theme.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::cli::AppContext;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::query::QueryEngine;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file; prints the snapshot to stdout when omitted
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Snapshot file to import
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirm the wipe
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// Theme to set (light, dark, system); shows the current one when omitted
    pub value: Option<String>,
}

pub fn run_stats(ctx: &AppContext) -> Result<()> {
    let stats = QueryEngine::new(&ctx.repo).statistics();

    let mut human = HumanOutput::new("Statistics");
    human.push_summary(ctx.i18n.t("stats.totalTasks"), stats.total_tasks.to_string());
    human.push_summary(
        ctx.i18n.t("stats.completedTasks"),
        stats.completed_tasks.to_string(),
    );
    human.push_summary(
        ctx.i18n.t("stats.pendingTasks"),
        stats.pending_tasks.to_string(),
    );
    human.push_summary(
        ctx.i18n.t("stats.overdueTasks"),
        stats.overdue_tasks.to_string(),
    );
    human.push_summary(
        ctx.i18n.t("stats.dueTodayTasks"),
        stats.due_today_tasks.to_string(),
    );
    human.push_summary(
        ctx.i18n.t("stats.totalCategories"),
        stats.total_categories.to_string(),
    );
    human.push_summary(
        ctx.i18n.t("stats.totalPriorities"),
        stats.total_priorities.to_string(),
    );
    emit_success(ctx.options, "stats", &stats, Some(&human))
}

pub fn run_export(ctx: &AppContext, args: ExportArgs) -> Result<()> {
    let snapshot = ctx.repo.export_data();

    match args.file {
        Some(path) => {
            let payload = serde_json::to_string_pretty(&snapshot)?;
            fs::write(&path, payload)?;

            let mut human = HumanOutput::new(ctx.i18n.t("messages.exported"));
            human.push_summary("File", path.display().to_string());
            human.push_summary("Tasks", snapshot.tasks.len().to_string());
            emit_success(
                ctx.options,
                "export",
                &serde_json::json!({
                    "file": path,
                    "tasks": snapshot.tasks.len(),
                    "categories": snapshot.categories.len(),
                    "priorities": snapshot.priorities.len(),
                }),
                Some(&human),
            )
        }
        // Bare snapshot on stdout so it can be piped straight to a file.
        None => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}

pub fn run_import(ctx: &AppContext, args: ImportArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidSnapshot(format!("not valid JSON: {e}")))?;
    let import = crate::repository::SnapshotImport::parse(&value)?;

    if !ctx.repo.import_data(&import) {
        return Err(Error::OperationFailed(
            "could not persist imported data".to_string(),
        ));
    }

    let mut human = HumanOutput::new(ctx.i18n.t("messages.imported"));
    if let Some(tasks) = &import.tasks {
        human.push_summary("Tasks", tasks.len().to_string());
    }
    if let Some(categories) = &import.categories {
        human.push_summary("Categories", categories.len().to_string());
    }
    if let Some(priorities) = &import.priorities {
        human.push_summary("Priorities", priorities.len().to_string());
    }
    emit_success(
        ctx.options,
        "import",
        &serde_json::json!({
            "tasks": import.tasks.as_ref().map(Vec::len),
            "categories": import.categories.as_ref().map(Vec::len),
            "priorities": import.priorities.as_ref().map(Vec::len),
        }),
        Some(&human),
    )
}

pub fn run_backup(ctx: &AppContext) -> Result<()> {
    if !ctx.repo.write_backup() {
        return Err(Error::OperationFailed(
            "could not write the backup slot".to_string(),
        ));
    }

    let human = HumanOutput::new(ctx.i18n.t("messages.backup"));
    emit_success(
        ctx.options,
        "backup",
        &serde_json::json!({ "written": true }),
        Some(&human),
    )
}

pub fn run_reset(ctx: &AppContext, args: ResetArgs) -> Result<()> {
    if !args.yes {
        return Err(Error::InvalidArgument(
            "reset removes all data; pass --yes to confirm".to_string(),
        ));
    }
    if !ctx.repo.clear_all() {
        return Err(Error::OperationFailed("could not reset data".to_string()));
    }

    let human = HumanOutput::new(ctx.i18n.t("messages.reset"));
    emit_success(
        ctx.options,
        "reset",
        &serde_json::json!({ "reset": true }),
        Some(&human),
    )
}

const THEMES: &[&str] = &["light", "dark", "system"];

pub fn run_theme(ctx: &AppContext, args: ThemeArgs) -> Result<()> {
    match args.value {
        Some(value) => {
            if !THEMES.contains(&value.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "unknown theme `{value}`; expected one of: {}",
                    THEMES.join(", ")
                )));
            }
            if !ctx.repo.set_theme(&value) {
                return Err(Error::OperationFailed("could not save theme".to_string()));
            }

            let mut human = HumanOutput::new(format!("Theme set to {value}"));
            human.push_summary("Theme", &value);
            emit_success(
                ctx.options,
                "theme",
                &serde_json::json!({ "theme": value }),
                Some(&human),
            )
        }
        None => {
            let theme = ctx.repo.theme();
            let mut human = HumanOutput::new(format!("Theme: {theme}"));
            human.push_summary("Theme", &theme);
            emit_success(
                ctx.options,
                "theme",
                &serde_json::json!({ "theme": theme }),
                Some(&human),
            )
        }
    }
}
