//! Query and statistics engine over the task collection.
//!
//! Pure, stateless passes over a snapshot fetched from the repository:
//! AND-combined filters, a full stable re-sort on every call, and
//! full-scan statistics with no memoization.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Category, DueStatus, Priority, Task};
use crate::repository::Repository;

/// Rank used when a task's priority cannot be resolved
const UNRESOLVED_PRIORITY_ORDER: u32 = 999;

/// Sort key for task listings.
///
/// `CreatedAt` and `UpdatedAt` share the timestamp default path; a missing
/// timestamp sorts as the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Title,
    DueDate,
    Priority,
    Category,
    Completed,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortBy::Title),
            "dueDate" | "due-date" | "due" => Ok(SortBy::DueDate),
            "priority" => Ok(SortBy::Priority),
            "category" => Ok(SortBy::Category),
            "completed" => Ok(SortBy::Completed),
            "createdAt" | "created" => Ok(SortBy::CreatedAt),
            "updatedAt" | "updated" => Ok(SortBy::UpdatedAt),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// AND-combined task filters plus the sort step applied to the result
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub category_id: Option<String>,
    pub priority_id: Option<String>,
    pub completed: Option<bool>,
    pub due_date_status: Option<DueStatus>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Aggregate counts over tasks, categories and priorities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub due_today_tasks: usize,
    pub total_categories: usize,
    pub total_priorities: usize,
}

/// Stateless query engine over a repository snapshot
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    repo: &'a Repository,
}

impl<'a> QueryEngine<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Filter and sort against the local calendar day
    pub fn filtered_tasks(&self, filters: &TaskFilters) -> Vec<Task> {
        self.filtered_tasks_at(filters, Local::now().date_naive())
    }

    /// Filter and sort with an injected "today" for due-status filters
    pub fn filtered_tasks_at(&self, filters: &TaskFilters, today: NaiveDate) -> Vec<Task> {
        let mut tasks = self.repo.tasks();

        if let Some(category_id) = &filters.category_id {
            tasks.retain(|t| t.category_id.as_deref() == Some(category_id.as_str()));
        }
        if let Some(priority_id) = &filters.priority_id {
            tasks.retain(|t| t.priority_id.as_deref() == Some(priority_id.as_str()));
        }
        if let Some(completed) = filters.completed {
            tasks.retain(|t| t.completed == completed);
        }
        if let Some(status) = filters.due_date_status {
            tasks.retain(|t| t.due_status(today) == Some(status));
        }

        sort_tasks(
            &mut tasks,
            filters.sort_by,
            filters.sort_order,
            &self.repo.categories(),
            &self.repo.priorities(),
        );
        tasks
    }

    /// Statistics against the local calendar day
    pub fn statistics(&self) -> Statistics {
        self.statistics_at(Local::now().date_naive())
    }

    /// Statistics with an injected "today" for the overdue/due-today counts
    pub fn statistics_at(&self, today: NaiveDate) -> Statistics {
        let tasks = self.repo.tasks();
        let completed = tasks.iter().filter(|t| t.completed).count();

        Statistics {
            total_tasks: tasks.len(),
            completed_tasks: completed,
            pending_tasks: tasks.len() - completed,
            overdue_tasks: tasks
                .iter()
                .filter(|t| !t.completed && t.due_status(today) == Some(DueStatus::Overdue))
                .count(),
            due_today_tasks: tasks
                .iter()
                .filter(|t| !t.completed && t.due_status(today) == Some(DueStatus::Today))
                .count(),
            total_categories: self.repo.categories().len(),
            total_priorities: self.repo.priorities().len(),
        }
    }
}

/// Stable full re-sort of a task list.
///
/// Descending order reverses the comparator, not the list, so equal keys
/// keep their relative input order in both directions.
pub fn sort_tasks(
    tasks: &mut [Task],
    sort_by: SortBy,
    sort_order: SortOrder,
    categories: &[Category],
    priorities: &[Priority],
) {
    let category_name = |task: &Task| -> Option<String> {
        let id = task.category_id.as_deref()?;
        categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.to_lowercase())
    };
    let priority_order = |task: &Task| -> u32 {
        task.priority_id
            .as_deref()
            .and_then(|id| priorities.iter().find(|p| p.id == id))
            .map(|p| p.order)
            .unwrap_or(UNRESOLVED_PRIORITY_ORDER)
    };

    tasks.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortBy::DueDate => {
                // Missing dates sort as far-future (last, ascending).
                let da = a.parsed_due_date().unwrap_or(NaiveDate::MAX);
                let db = b.parsed_due_date().unwrap_or(NaiveDate::MAX);
                da.cmp(&db)
            }
            SortBy::Priority => priority_order(a).cmp(&priority_order(b)),
            SortBy::Category => {
                // None compares greater than Some, so unresolvable sorts last.
                let ka = (category_name(a).is_none(), category_name(a));
                let kb = (category_name(b).is_none(), category_name(b));
                ka.cmp(&kb)
            }
            SortBy::Completed => a.completed.cmp(&b.completed),
            SortBy::CreatedAt => timestamp(a.created_at).cmp(&timestamp(b.created_at)),
            SortBy::UpdatedAt => timestamp(a.updated_at).cmp(&timestamp(b.updated_at)),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn timestamp(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskPatch;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seed_repo(temp: &TempDir) -> Repository {
        Repository::open(temp.path().join("data")).unwrap()
    }

    fn add(repo: &Repository, title: &str) -> Task {
        repo.add_task(Task::new(title)).unwrap()
    }

    #[test]
    fn completed_filter_excludes_other_state() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);
        let engine = QueryEngine::new(&repo);

        let open = add(&repo, "open");
        let done = add(&repo, "done");
        repo.update_task(
            &done.id,
            &TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .unwrap();

        let filters = TaskFilters {
            completed: Some(false),
            ..TaskFilters::default()
        };
        let result = engine.filtered_tasks_at(&filters, day("2025-06-15"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, open.id);
    }

    #[test]
    fn filters_combine_with_and() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);
        let engine = QueryEngine::new(&repo);
        let work = repo.categories()[0].id.clone();

        let mut both = Task::new("both");
        both.category_id = Some(work.clone());
        both.due_date = Some("2025-06-15".to_string());
        let both = repo.add_task(both).unwrap();

        let mut only_cat = Task::new("only category");
        only_cat.category_id = Some(work.clone());
        repo.add_task(only_cat).unwrap();

        let filters = TaskFilters {
            category_id: Some(work),
            due_date_status: Some(DueStatus::Today),
            ..TaskFilters::default()
        };
        let result = engine.filtered_tasks_at(&filters, day("2025-06-15"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, both.id);
    }

    #[test]
    fn title_sort_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);

        let mut tasks = vec![
            add(&repo, "banana"),
            add(&repo, "Apple"),
            add(&repo, "cherry"),
        ];
        sort_tasks(&mut tasks, SortBy::Title, SortOrder::Asc, &[], &[]);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Apple", "banana", "cherry"]);
    }

    #[test]
    fn missing_due_dates_sort_last_ascending() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);

        let mut undated = Task::new("undated");
        undated.due_date = None;
        let undated = repo.add_task(undated).unwrap();
        let mut dated = Task::new("dated");
        dated.due_date = Some("2025-01-01".to_string());
        let dated = repo.add_task(dated).unwrap();

        let mut tasks = vec![undated.clone(), dated.clone()];
        sort_tasks(&mut tasks, SortBy::DueDate, SortOrder::Asc, &[], &[]);
        assert_eq!(tasks[0].id, dated.id);
        assert_eq!(tasks[1].id, undated.id);
    }

    #[test]
    fn priority_sort_ranks_unresolved_last() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);
        let priorities = repo.priorities();
        let high = priorities.iter().find(|p| p.name == "High").unwrap();
        let low = priorities.iter().find(|p| p.name == "Low").unwrap();

        let mut h = Task::new("high");
        h.priority_id = Some(high.id.clone());
        let mut l = Task::new("low");
        l.priority_id = Some(low.id.clone());
        let n = Task::new("none");
        let mut tasks = vec![
            repo.add_task(l).unwrap(),
            repo.add_task(n).unwrap(),
            repo.add_task(h).unwrap(),
        ];

        sort_tasks(
            &mut tasks,
            SortBy::Priority,
            SortOrder::Asc,
            &[],
            &priorities,
        );
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["high", "low", "none"]);
    }

    #[test]
    fn category_sort_by_name_unresolvable_last() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);
        let categories = repo.categories();
        let work = categories.iter().find(|c| c.name == "Work").unwrap();
        let health = categories.iter().find(|c| c.name == "Health").unwrap();

        let mut w = Task::new("in work");
        w.category_id = Some(work.id.clone());
        let mut h = Task::new("in health");
        h.category_id = Some(health.id.clone());
        let mut ghost = Task::new("dangling");
        ghost.category_id = Some("no-such-category".to_string());

        let mut tasks = vec![
            repo.add_task(w).unwrap(),
            repo.add_task(ghost).unwrap(),
            repo.add_task(h).unwrap(),
        ];
        sort_tasks(
            &mut tasks,
            SortBy::Category,
            SortOrder::Asc,
            &categories,
            &[],
        );
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["in health", "in work", "dangling"]);
    }

    #[test]
    fn descending_ties_keep_input_order() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);

        // Same title key, distinct ids; order must survive the desc sort.
        let first = add(&repo, "same");
        let second = add(&repo, "same");
        let third = add(&repo, "same");
        let mut tasks = vec![first.clone(), second.clone(), third.clone()];

        sort_tasks(&mut tasks, SortBy::Title, SortOrder::Desc, &[], &[]);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, [&first.id, &second.id, &third.id]);
    }

    #[test]
    fn statistics_counts() {
        let temp = TempDir::new().unwrap();
        let repo = seed_repo(&temp);
        let engine = QueryEngine::new(&repo);
        let today = day("2025-06-15");

        let mut overdue = Task::new("late");
        overdue.due_date = Some("2025-06-10".to_string());
        repo.add_task(overdue).unwrap();

        let mut due_today = Task::new("now");
        due_today.due_date = Some("2025-06-15".to_string());
        repo.add_task(due_today).unwrap();

        let done = add(&repo, "done");
        repo.update_task(
            &done.id,
            &TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .unwrap();

        let stats = engine.statistics_at(today);
        assert_eq!(
            stats,
            Statistics {
                total_tasks: 3,
                completed_tasks: 1,
                pending_tasks: 2,
                overdue_tasks: 1,
                due_today_tasks: 1,
                total_categories: 4,
                total_priorities: 4,
            }
        );
    }

    #[test]
    fn statistics_payload_is_camel_case() {
        let stats = Statistics {
            total_tasks: 1,
            completed_tasks: 0,
            pending_tasks: 1,
            overdue_tasks: 0,
            due_today_tasks: 0,
            total_categories: 4,
            total_priorities: 4,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalTasks"], 1);
        assert_eq!(json["pendingTasks"], 1);
    }
}
