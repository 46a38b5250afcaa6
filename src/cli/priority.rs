//! `tasktogo priority` subcommands.

use clap::{Args, Subcommand};

use crate::cli::{resolve_priority, AppContext};
use crate::error::{Error, Result};
use crate::model::{Priority, PriorityPatch};
use crate::output::{emit_success, HumanOutput};

#[derive(Subcommand, Debug)]
pub enum PriorityCommands {
    /// Add a new priority level
    Add(AddArgs),

    /// List priorities ordered by rank
    List,

    /// Edit a priority's name, color or rank
    Edit(EditArgs),

    /// Remove a priority (its tasks fall back to Normal)
    Rm(RmArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Priority name
    pub name: String,

    /// Hex color, e.g. #EF4444
    #[arg(long, default_value = "#6B7280")]
    pub color: String,

    /// Sort rank; lower means more urgent. Defaults to the end of the list
    #[arg(long)]
    pub order: Option<u32>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Priority name or id
    pub priority: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New hex color
    #[arg(long)]
    pub color: Option<String>,

    /// New sort rank
    #[arg(long)]
    pub order: Option<u32>,
}

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Priority name or id
    pub priority: String,
}

pub fn run(ctx: &AppContext, command: PriorityCommands) -> Result<()> {
    match command {
        PriorityCommands::Add(args) => run_add(ctx, args),
        PriorityCommands::List => run_list(ctx),
        PriorityCommands::Edit(args) => run_edit(ctx, args),
        PriorityCommands::Rm(args) => run_rm(ctx, args),
    }
}

fn run_add(ctx: &AppContext, args: AddArgs) -> Result<()> {
    let order = args
        .order
        .unwrap_or_else(|| ctx.repo.priorities().len() as u32 + 1);
    let draft = Priority::new(args.name, args.color, order);
    let errors = draft.validate();
    if !errors.is_empty() {
        return Err(Error::validation(errors));
    }
    let priority = ctx
        .repo
        .add_priority(draft)
        .ok_or_else(|| Error::OperationFailed("could not persist priority".to_string()))?;

    let mut human = HumanOutput::new(format!("Added priority '{}'", priority.name));
    human.push_summary("Id", &priority.id);
    human.push_summary("Order", priority.order.to_string());
    emit_success(ctx.options, "priority add", &priority, Some(&human))
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let mut priorities = ctx.repo.priorities();
    priorities.sort_by_key(|p| p.order);

    let mut human = HumanOutput::new(format!("{} priorit(ies)", priorities.len()));
    for priority in &priorities {
        human.push_detail(format!(
            "{}. {}  {}  ({})",
            priority.order, priority.name, priority.color, priority.id
        ));
    }
    emit_success(ctx.options, "priority list", &priorities, Some(&human))
}

fn run_edit(ctx: &AppContext, args: EditArgs) -> Result<()> {
    let existing = resolve_priority(&ctx.repo, &args.priority)?;
    let patch = PriorityPatch {
        name: args.name,
        color: args.color,
        order: args.order,
    };
    if patch.name.is_none() && patch.color.is_none() && patch.order.is_none() {
        return Err(Error::InvalidArgument(
            "no fields to edit; pass --name, --color or --order".to_string(),
        ));
    }

    let mut preview = existing.clone();
    patch.apply(&mut preview);
    let errors = preview.validate();
    if !errors.is_empty() {
        return Err(Error::validation(errors));
    }

    let priority = ctx
        .repo
        .update_priority(&existing.id, &patch)
        .ok_or_else(|| Error::PriorityNotFound(args.priority.clone()))?;

    let mut human = HumanOutput::new(format!("Updated priority '{}'", priority.name));
    human.push_summary("Id", &priority.id);
    emit_success(ctx.options, "priority edit", &priority, Some(&human))
}

fn run_rm(ctx: &AppContext, args: RmArgs) -> Result<()> {
    let existing = resolve_priority(&ctx.repo, &args.priority)?;
    if !ctx.repo.delete_priority(&existing.id) {
        return Err(Error::OperationFailed(
            "could not remove priority".to_string(),
        ));
    }

    let human = HumanOutput::new(format!("Removed priority '{}'", existing.name));
    emit_success(
        ctx.options,
        "priority rm",
        &serde_json::json!({ "id": existing.id }),
        Some(&human),
    )
}
