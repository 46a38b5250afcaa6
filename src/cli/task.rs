//! `tasktogo task` subcommands.

use clap::{Args, Subcommand};

use crate::cli::{resolve_category, resolve_priority, AppContext};
use crate::error::{Error, Result};
use crate::model::{DueStatus, ImageInput, Task, TaskPatch};
use crate::output::{emit_success, HumanOutput};
use crate::query::{SortBy, SortOrder, TaskFilters};
use crate::service::TaskService;

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a new task
    Add(AddArgs),

    /// List tasks with optional filters
    List(ListArgs),

    /// Show a single task in full
    Show(ShowArgs),

    /// Edit fields of a task
    Edit(EditArgs),

    /// Toggle a task's completion state
    Done(ShowArgs),

    /// Remove a task
    Rm(ShowArgs),

    /// Attach an image (data URI) to a task
    Attach(AttachArgs),

    /// Remove an image attachment from a task
    Detach(DetachArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Longer description
    #[arg(long)]
    pub description: Option<String>,

    /// Category name or id
    #[arg(long)]
    pub category: Option<String>,

    /// Priority name or id
    #[arg(long)]
    pub priority: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only tasks in this category (name or id)
    #[arg(long)]
    pub category: Option<String>,

    /// Only tasks with this priority (name or id)
    #[arg(long)]
    pub priority: Option<String>,

    /// Only completed tasks
    #[arg(long, conflicts_with = "pending")]
    pub completed: bool,

    /// Only pending tasks
    #[arg(long)]
    pub pending: bool,

    /// Only tasks with this due status (overdue, today, tomorrow, soon, future)
    #[arg(long, value_name = "STATUS")]
    pub due_status: Option<DueStatus>,

    /// Sort field (title, due, priority, category, completed, created, updated)
    #[arg(long, default_value = "created")]
    pub sort: SortBy,

    /// Sort direction (asc, desc)
    #[arg(long, default_value = "desc")]
    pub order: SortOrder,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New category (name or id)
    #[arg(long, conflicts_with = "clear_category")]
    pub category: Option<String>,

    /// Remove the category assignment
    #[arg(long)]
    pub clear_category: bool,

    /// New priority (name or id)
    #[arg(long, conflicts_with = "clear_priority")]
    pub priority: Option<String>,

    /// Remove the priority assignment
    #[arg(long)]
    pub clear_priority: bool,

    /// New due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,

    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
}

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Task id
    pub id: String,

    /// Image payload as a data URI (data:image/png;base64,...)
    pub data: String,
}

#[derive(Args, Debug)]
pub struct DetachArgs {
    /// Task id
    pub id: String,

    /// Attachment id
    pub image_id: String,
}

pub fn run(ctx: &AppContext, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add(args) => run_add(ctx, args),
        TaskCommands::List(args) => run_list(ctx, args),
        TaskCommands::Show(args) => run_show(ctx, args),
        TaskCommands::Edit(args) => run_edit(ctx, args),
        TaskCommands::Done(args) => run_done(ctx, args),
        TaskCommands::Rm(args) => run_rm(ctx, args),
        TaskCommands::Attach(args) => run_attach(ctx, args),
        TaskCommands::Detach(args) => run_detach(ctx, args),
    }
}

fn run_add(ctx: &AppContext, args: AddArgs) -> Result<()> {
    let mut draft = Task::new(args.title);
    if let Some(description) = args.description {
        draft.description = description;
    }
    if let Some(reference) = args.category.as_deref() {
        draft.category_id = Some(resolve_category(&ctx.repo, reference)?.id);
    }
    if let Some(reference) = args.priority.as_deref() {
        draft.priority_id = Some(resolve_priority(&ctx.repo, reference)?.id);
    }
    draft.due_date = args.due;

    let service = TaskService::new(&ctx.repo);
    let task = service.add(draft)?;

    let mut human = HumanOutput::new(format!("Added task '{}'", task.title));
    human.push_summary("Id", &task.id);
    if let Some(status) = task.due_status_now() {
        human.push_summary("Due", ctx.i18n.due_label(status));
    }
    emit_success(ctx.options, "task add", &task, Some(&human))
}

fn run_list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let mut filters = TaskFilters {
        sort_by: args.sort,
        sort_order: args.order,
        due_date_status: args.due_status,
        ..TaskFilters::default()
    };
    if let Some(reference) = args.category.as_deref() {
        filters.category_id = Some(resolve_category(&ctx.repo, reference)?.id);
    }
    if let Some(reference) = args.priority.as_deref() {
        filters.priority_id = Some(resolve_priority(&ctx.repo, reference)?.id);
    }
    if args.completed {
        filters.completed = Some(true);
    } else if args.pending {
        filters.completed = Some(false);
    }

    let service = TaskService::new(&ctx.repo);
    let tasks = service.list(&filters);

    let mut human = HumanOutput::new(format!("{} task(s)", tasks.len()));
    for task in &tasks {
        human.push_detail(format_row(ctx, task));
    }
    emit_success(ctx.options, "task list", &tasks, Some(&human))
}

fn run_show(ctx: &AppContext, args: ShowArgs) -> Result<()> {
    let service = TaskService::new(&ctx.repo);
    let task = service
        .get(&args.id)
        .ok_or_else(|| Error::TaskNotFound(args.id.clone()))?;

    let mut human = HumanOutput::new(task.title.clone());
    human.push_summary("Id", &task.id);
    human.push_summary("Completed", if task.completed { "yes" } else { "no" });
    if !task.description.is_empty() {
        human.push_summary("Description", &task.description);
    }
    if let Some(category) = task
        .category_id
        .as_deref()
        .and_then(|id| ctx.repo.get_category(id))
    {
        human.push_summary("Category", &category.name);
    }
    if let Some(priority) = task
        .priority_id
        .as_deref()
        .and_then(|id| ctx.repo.get_priority(id))
    {
        human.push_summary("Priority", &priority.name);
    }
    if let Some(due) = task.due_date.as_deref() {
        let label = match task.due_status_now() {
            Some(status) => format!("{due} ({})", ctx.i18n.due_label(status)),
            None => due.to_string(),
        };
        human.push_summary("Due", label);
    }
    for image in &task.images {
        human.push_detail(format!("image {} ({})", image.id, image.kind));
    }
    emit_success(ctx.options, "task show", &task, Some(&human))
}

fn run_edit(ctx: &AppContext, args: EditArgs) -> Result<()> {
    let mut patch = TaskPatch {
        title: args.title,
        description: args.description,
        ..TaskPatch::default()
    };
    if let Some(reference) = args.category.as_deref() {
        patch.category_id = Some(Some(resolve_category(&ctx.repo, reference)?.id));
    } else if args.clear_category {
        patch.category_id = Some(None);
    }
    if let Some(reference) = args.priority.as_deref() {
        patch.priority_id = Some(Some(resolve_priority(&ctx.repo, reference)?.id));
    } else if args.clear_priority {
        patch.priority_id = Some(None);
    }
    if let Some(due) = args.due {
        patch.due_date = Some(Some(due));
    } else if args.clear_due {
        patch.due_date = Some(None);
    }
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "no fields to edit; pass at least one option".to_string(),
        ));
    }

    let service = TaskService::new(&ctx.repo);
    let task = service.update(&args.id, &patch)?;

    let mut human = HumanOutput::new(format!("Updated task '{}'", task.title));
    human.push_summary("Id", &task.id);
    emit_success(ctx.options, "task edit", &task, Some(&human))
}

fn run_done(ctx: &AppContext, args: ShowArgs) -> Result<()> {
    let service = TaskService::new(&ctx.repo);
    let task = service.toggle_completion(&args.id)?;

    let header = if task.completed {
        format!("Completed task '{}'", task.title)
    } else {
        format!("Reopened task '{}'", task.title)
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("Id", &task.id);
    emit_success(ctx.options, "task done", &task, Some(&human))
}

fn run_rm(ctx: &AppContext, args: ShowArgs) -> Result<()> {
    let service = TaskService::new(&ctx.repo);
    service.delete(&args.id)?;

    let human = HumanOutput::new(format!("Removed task {}", args.id));
    emit_success(
        ctx.options,
        "task rm",
        &serde_json::json!({ "id": args.id }),
        Some(&human),
    )
}

fn run_attach(ctx: &AppContext, args: AttachArgs) -> Result<()> {
    let service = TaskService::new(&ctx.repo);
    let (task, image) = service.attach_image(&args.id, ImageInput::Data(args.data))?;

    let mut human = HumanOutput::new(format!("Attached image to '{}'", task.title));
    human.push_summary("Image", &image.id);
    human.push_summary("Type", &image.kind);
    emit_success(ctx.options, "task attach", &task, Some(&human))
}

fn run_detach(ctx: &AppContext, args: DetachArgs) -> Result<()> {
    let service = TaskService::new(&ctx.repo);
    let task = service.remove_image(&args.id, &args.image_id)?;

    let mut human = HumanOutput::new(format!("Removed image from '{}'", task.title));
    human.push_summary("Id", &task.id);
    emit_success(ctx.options, "task detach", &task, Some(&human))
}

fn format_row(ctx: &AppContext, task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut row = format!("[{mark}] {}  ({})", task.title, task.id);
    if let Some(status) = task.due_status_now() {
        if !task.completed {
            row.push_str(&format!("  {}", ctx.i18n.due_label(status)));
        }
    }
    row
}
