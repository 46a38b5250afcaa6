//! `tasktogo category` subcommands.

use clap::{Args, Subcommand};

use crate::cli::{resolve_category, AppContext};
use crate::error::{Error, Result};
use crate::model::{Category, CategoryPatch};
use crate::output::{emit_success, HumanOutput};

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Add a new category
    Add(AddArgs),

    /// List categories
    List,

    /// Edit a category's name or color
    Edit(EditArgs),

    /// Remove a category (tasks keep existing without it)
    Rm(RmArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Category name
    pub name: String,

    /// Hex color, e.g. #3B82F6
    #[arg(long, default_value = "#6B7280")]
    pub color: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Category name or id
    pub category: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New hex color
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Category name or id
    pub category: String,
}

pub fn run(ctx: &AppContext, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::Add(args) => run_add(ctx, args),
        CategoryCommands::List => run_list(ctx),
        CategoryCommands::Edit(args) => run_edit(ctx, args),
        CategoryCommands::Rm(args) => run_rm(ctx, args),
    }
}

fn run_add(ctx: &AppContext, args: AddArgs) -> Result<()> {
    let draft = Category::new(args.name, args.color);
    let errors = draft.validate();
    if !errors.is_empty() {
        return Err(Error::validation(errors));
    }
    let category = ctx
        .repo
        .add_category(draft)
        .ok_or_else(|| Error::OperationFailed("could not persist category".to_string()))?;

    let mut human = HumanOutput::new(format!("Added category '{}'", category.name));
    human.push_summary("Id", &category.id);
    human.push_summary("Color", &category.color);
    emit_success(ctx.options, "category add", &category, Some(&human))
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let categories = ctx.repo.categories();

    let mut human = HumanOutput::new(format!("{} categorie(s)", categories.len()));
    for category in &categories {
        human.push_detail(format!(
            "{}  {}  ({})",
            category.name, category.color, category.id
        ));
    }
    emit_success(ctx.options, "category list", &categories, Some(&human))
}

fn run_edit(ctx: &AppContext, args: EditArgs) -> Result<()> {
    let existing = resolve_category(&ctx.repo, &args.category)?;
    let patch = CategoryPatch {
        name: args.name,
        color: args.color,
    };
    if patch.name.is_none() && patch.color.is_none() {
        return Err(Error::InvalidArgument(
            "no fields to edit; pass --name or --color".to_string(),
        ));
    }

    let mut preview = existing.clone();
    patch.apply(&mut preview);
    let errors = preview.validate();
    if !errors.is_empty() {
        return Err(Error::validation(errors));
    }

    let category = ctx
        .repo
        .update_category(&existing.id, &patch)
        .ok_or_else(|| Error::CategoryNotFound(args.category.clone()))?;

    let mut human = HumanOutput::new(format!("Updated category '{}'", category.name));
    human.push_summary("Id", &category.id);
    emit_success(ctx.options, "category edit", &category, Some(&human))
}

fn run_rm(ctx: &AppContext, args: RmArgs) -> Result<()> {
    let existing = resolve_category(&ctx.repo, &args.category)?;
    if !ctx.repo.delete_category(&existing.id) {
        return Err(Error::OperationFailed(
            "could not remove category".to_string(),
        ));
    }

    let human = HumanOutput::new(format!("Removed category '{}'", existing.name));
    emit_success(
        ctx.options,
        "category rm",
        &serde_json::json!({ "id": existing.id }),
        Some(&human),
    )
}
