//! Storage layer: typed CRUD over the persisted collections.
//!
//! The repository is the sole writer of persisted state. Every operation
//! is whole-collection read-modify-write over the [`KvStore`]; every
//! storage failure is caught here, logged, and converted to a `None` /
//! `false` return. Callers treat `None` from a mutating call as "the
//! operation did not apply".

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Category, CategoryPatch, Priority, PriorityPatch, Task, TaskPatch};
use crate::store::{
    KvStore, KEY_BACKUP, KEY_CATEGORIES, KEY_PRIORITIES, KEY_SETTINGS, KEY_TASKS, KEY_THEME,
};

/// Snapshot format version tag
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Theme used when none is persisted
pub const DEFAULT_THEME: &str = "system";

/// Full export of all persisted collections at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub priorities: Vec<Priority>,
    pub settings: Map<String, Value>,
    pub theme: String,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// Parsed import payload: only present top-level fields are applied
#[derive(Debug, Clone, Default)]
pub struct SnapshotImport {
    pub tasks: Option<Vec<Task>>,
    pub categories: Option<Vec<Category>>,
    pub priorities: Option<Vec<Priority>>,
    pub settings: Option<Map<String, Value>>,
    pub theme: Option<String>,
}

impl SnapshotImport {
    /// Structurally validate a raw snapshot before anything is written.
    ///
    /// A field that is present but not a well-formed sequence (or map, for
    /// settings) rejects the whole payload; an absent field is skipped and
    /// the persisted collection is left untouched.
    pub fn parse(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidSnapshot("payload is not an object".into()));
        }

        Ok(Self {
            tasks: parse_field(value, "tasks")?,
            categories: parse_field(value, "categories")?,
            priorities: parse_field(value, "priorities")?,
            settings: parse_field(value, "settings")?,
            theme: parse_field(value, "theme")?,
        })
    }
}

fn parse_field<T: DeserializeOwned>(value: &Value, field: &str) -> Result<Option<T>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| Error::InvalidSnapshot(format!("field `{field}` is malformed: {e}"))),
    }
}

/// Whether the startup integrity sweep repairs, only reports, or is skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityMode {
    #[default]
    Repair,
    Warn,
    Off,
}

/// Outcome of the orphaned-task sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub total_tasks: usize,
    pub orphaned_tasks: usize,
    pub repaired_tasks: usize,
}

/// Typed storage over the persisted collections
#[derive(Debug, Clone)]
pub struct Repository {
    store: KvStore,
}

impl Repository {
    /// Open the repository at a data directory and seed defaults
    pub fn open(root: impl Into<std::path::PathBuf>) -> Result<Self> {
        let repo = Self {
            store: KvStore::open(root)?,
        };
        repo.initialize_defaults();
        Ok(repo)
    }

    /// Underlying key-value store
    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Seed default categories and priorities when the respective
    /// collection is empty. Idempotent: never overwrites non-empty data.
    pub fn initialize_defaults(&self) {
        if self.categories().is_empty() {
            let defaults = [
                ("Work", "#3B82F6"),
                ("Personal", "#10B981"),
                ("Shopping", "#F59E0B"),
                ("Health", "#EF4444"),
            ];
            let now = Utc::now();
            let categories: Vec<Category> = defaults
                .into_iter()
                .map(|(name, color)| Category {
                    id: new_id(),
                    name: name.to_string(),
                    color: color.to_string(),
                    created_at: now,
                })
                .collect();
            self.write_collection(KEY_CATEGORIES, &categories);
        }

        if self.priorities().is_empty() {
            let defaults = [
                ("High", "#EF4444", 1),
                ("Medium", "#F59E0B", 2),
                ("Low", "#10B981", 3),
                ("Normal", "#6B7280", 4),
            ];
            let now = Utc::now();
            let priorities: Vec<Priority> = defaults
                .into_iter()
                .map(|(name, color, order)| Priority {
                    id: new_id(),
                    name: name.to_string(),
                    color: color.to_string(),
                    order,
                    created_at: now,
                })
                .collect();
            self.write_collection(KEY_PRIORITIES, &priorities);
        }
    }

    // =========================================================================
    // Caught-failure primitives
    // =========================================================================

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get::<Vec<T>>(key) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                error!(key, %err, "failed to read collection");
                Vec::new()
            }
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> bool {
        match self.store.set(key, &items) {
            Ok(()) => true,
            Err(err) => {
                error!(key, %err, "failed to write collection");
                false
            }
        }
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// All persisted tasks (empty when nothing is stored)
    pub fn tasks(&self) -> Vec<Task> {
        self.read_collection(KEY_TASKS)
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.tasks().into_iter().find(|t| t.id == id)
    }

    /// Persist a draft task: assigns a fresh id, stamps `created_at` and
    /// `updated_at`, appends. Returns the stored record, or `None` when
    /// the underlying write fails.
    pub fn add_task(&self, mut draft: Task) -> Option<Task> {
        let now = Utc::now();
        draft.id = new_id();
        draft.created_at = now;
        draft.updated_at = now;

        let mut tasks = self.tasks();
        tasks.push(draft.clone());
        self.write_collection(KEY_TASKS, &tasks).then_some(draft)
    }

    /// Apply a patch to the task with the given id, re-stamping
    /// `updated_at`. `None` when the task is absent or the write fails.
    pub fn update_task(&self, id: &str, patch: &TaskPatch) -> Option<Task> {
        let mut tasks = self.tasks();
        let task = tasks.iter_mut().find(|t| t.id == id)?;
        patch.apply(task);
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.write_collection(KEY_TASKS, &tasks).then_some(updated)
    }

    /// Remove a task by id. Returns the success of the underlying write,
    /// not whether a record existed.
    pub fn delete_task(&self, id: &str) -> bool {
        let mut tasks = self.tasks();
        tasks.retain(|t| t.id != id);
        self.write_collection(KEY_TASKS, &tasks)
    }

    /// Overwrite the whole task collection
    pub fn set_tasks(&self, tasks: &[Task]) -> bool {
        self.write_collection(KEY_TASKS, tasks)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn categories(&self) -> Vec<Category> {
        self.read_collection(KEY_CATEGORIES)
    }

    pub fn get_category(&self, id: &str) -> Option<Category> {
        self.categories().into_iter().find(|c| c.id == id)
    }

    pub fn add_category(&self, mut draft: Category) -> Option<Category> {
        draft.id = new_id();
        draft.created_at = Utc::now();

        let mut categories = self.categories();
        categories.push(draft.clone());
        self.write_collection(KEY_CATEGORIES, &categories)
            .then_some(draft)
    }

    pub fn update_category(&self, id: &str, patch: &CategoryPatch) -> Option<Category> {
        let mut categories = self.categories();
        let category = categories.iter_mut().find(|c| c.id == id)?;
        patch.apply(category);
        let updated = category.clone();
        self.write_collection(KEY_CATEGORIES, &categories)
            .then_some(updated)
    }

    /// Delete a category, cascading first: every task referencing it gets
    /// `category_id = None` (with `updated_at` re-stamped) and the task
    /// collection is persisted before the category collection.
    pub fn delete_category(&self, id: &str) -> bool {
        let mut tasks = self.tasks();
        let now = Utc::now();
        let mut touched = false;
        for task in tasks.iter_mut() {
            if task.category_id.as_deref() == Some(id) {
                task.category_id = None;
                task.updated_at = now;
                touched = true;
            }
        }
        if touched && !self.write_collection(KEY_TASKS, &tasks) {
            return false;
        }

        let mut categories = self.categories();
        categories.retain(|c| c.id != id);
        self.write_collection(KEY_CATEGORIES, &categories)
    }

    // =========================================================================
    // Priorities
    // =========================================================================

    pub fn priorities(&self) -> Vec<Priority> {
        self.read_collection(KEY_PRIORITIES)
    }

    pub fn get_priority(&self, id: &str) -> Option<Priority> {
        self.priorities().into_iter().find(|p| p.id == id)
    }

    pub fn add_priority(&self, mut draft: Priority) -> Option<Priority> {
        let mut priorities = self.priorities();
        draft.id = new_id();
        draft.created_at = Utc::now();
        if draft.order == 0 {
            draft.order = priorities.len() as u32 + 1;
        }

        priorities.push(draft.clone());
        self.write_collection(KEY_PRIORITIES, &priorities)
            .then_some(draft)
    }

    pub fn update_priority(&self, id: &str, patch: &PriorityPatch) -> Option<Priority> {
        let mut priorities = self.priorities();
        let priority = priorities.iter_mut().find(|p| p.id == id)?;
        patch.apply(priority);
        let updated = priority.clone();
        self.write_collection(KEY_PRIORITIES, &priorities)
            .then_some(updated)
    }

    /// Delete a priority, cascading first: dependent tasks are reassigned
    /// to the surviving priority named "Normal" (case-insensitive) when one
    /// exists, else to `None`. The reassignment target is resolved against
    /// the collection with the deleted record already filtered out, so
    /// deleting "Normal" itself cannot leave a dangling reference.
    pub fn delete_priority(&self, id: &str) -> bool {
        let mut priorities = self.priorities();
        priorities.retain(|p| p.id != id);
        let fallback_id = priorities
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case("normal"))
            .map(|p| p.id.clone());

        let mut tasks = self.tasks();
        let now = Utc::now();
        let mut touched = false;
        for task in tasks.iter_mut() {
            if task.priority_id.as_deref() == Some(id) {
                task.priority_id = fallback_id.clone();
                task.updated_at = now;
                touched = true;
            }
        }
        if touched && !self.write_collection(KEY_TASKS, &tasks) {
            return false;
        }

        self.write_collection(KEY_PRIORITIES, &priorities)
    }

    // =========================================================================
    // Settings and theme
    // =========================================================================

    /// Flat settings map (empty when nothing is persisted)
    pub fn settings(&self) -> Map<String, Value> {
        match self.store.get::<Map<String, Value>>(KEY_SETTINGS) {
            Ok(Some(map)) => map,
            Ok(None) => Map::new(),
            Err(err) => {
                error!(%err, "failed to read settings");
                Map::new()
            }
        }
    }

    pub fn set_settings(&self, settings: &Map<String, Value>) -> bool {
        match self.store.set(KEY_SETTINGS, settings) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "failed to write settings");
                false
            }
        }
    }

    pub fn get_setting(&self, key: &str) -> Option<Value> {
        self.settings().get(key).cloned()
    }

    pub fn set_setting(&self, key: &str, value: Value) -> bool {
        let mut settings = self.settings();
        settings.insert(key.to_string(), value);
        self.set_settings(&settings)
    }

    /// Theme preference scalar, defaulting to `"system"`
    pub fn theme(&self) -> String {
        match self.store.get_string(KEY_THEME) {
            Ok(Some(theme)) if !theme.is_empty() => theme,
            Ok(_) => DEFAULT_THEME.to_string(),
            Err(err) => {
                error!(%err, "failed to read theme");
                DEFAULT_THEME.to_string()
            }
        }
    }

    pub fn set_theme(&self, theme: &str) -> bool {
        match self.store.set_string(KEY_THEME, theme) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "failed to write theme");
                false
            }
        }
    }

    // =========================================================================
    // Export / import / reset / backup
    // =========================================================================

    /// Snapshot all persisted collections plus settings and theme
    pub fn export_data(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks(),
            categories: self.categories(),
            priorities: self.priorities(),
            settings: self.settings(),
            theme: self.theme(),
            exported_at: Utc::now(),
            version: SNAPSHOT_VERSION.to_string(),
        }
    }

    /// Overwrite each collection present in the (already validated)
    /// import wholesale; absent fields stay untouched.
    pub fn import_data(&self, import: &SnapshotImport) -> bool {
        let mut ok = true;
        if let Some(tasks) = &import.tasks {
            ok &= self.write_collection(KEY_TASKS, tasks);
        }
        if let Some(categories) = &import.categories {
            ok &= self.write_collection(KEY_CATEGORIES, categories);
        }
        if let Some(priorities) = &import.priorities {
            ok &= self.write_collection(KEY_PRIORITIES, priorities);
        }
        if let Some(settings) = &import.settings {
            ok &= self.set_settings(settings);
        }
        if let Some(theme) = &import.theme {
            ok &= self.set_theme(theme);
        }
        ok
    }

    /// Remove every persisted key except the theme preference, then reseed
    /// defaults
    pub fn clear_all(&self) -> bool {
        for key in [KEY_TASKS, KEY_CATEGORIES, KEY_PRIORITIES, KEY_SETTINGS, KEY_BACKUP] {
            if let Err(err) = self.store.remove(key) {
                error!(key, %err, "failed to clear key");
                return false;
            }
        }
        self.initialize_defaults();
        true
    }

    /// Copy a full snapshot into the secondary backup slot
    pub fn write_backup(&self) -> bool {
        let snapshot = self.export_data();
        match self.store.set(KEY_BACKUP, &snapshot) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "backup write failed");
                false
            }
        }
    }

    // =========================================================================
    // Integrity sweep
    // =========================================================================

    /// Detect tasks referencing nonexistent category/priority ids and, in
    /// [`IntegrityMode::Repair`], reassign them to the first available
    /// category and the priority named "Normal" (or the first available
    /// priority). In [`IntegrityMode::Warn`] only the counts are reported.
    pub fn check_integrity(&self, mode: IntegrityMode) -> IntegrityReport {
        let mut report = IntegrityReport::default();
        if mode == IntegrityMode::Off {
            return report;
        }

        let categories = self.categories();
        let priorities = self.priorities();
        let mut tasks = self.tasks();
        report.total_tasks = tasks.len();

        let fallback_category = categories.first().map(|c| c.id.clone());
        let fallback_priority = priorities
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case("normal"))
            .or_else(|| priorities.first())
            .map(|p| p.id.clone());

        let now = Utc::now();
        for task in tasks.iter_mut() {
            let bad_category = task
                .category_id
                .as_deref()
                .is_some_and(|id| !categories.iter().any(|c| c.id == id));
            let bad_priority = task
                .priority_id
                .as_deref()
                .is_some_and(|id| !priorities.iter().any(|p| p.id == id));
            if !bad_category && !bad_priority {
                continue;
            }

            report.orphaned_tasks += 1;
            if mode == IntegrityMode::Repair {
                if bad_category {
                    task.category_id = fallback_category.clone();
                }
                if bad_priority {
                    task.priority_id = fallback_priority.clone();
                }
                task.updated_at = now;
                report.repaired_tasks += 1;
            }
        }

        if report.orphaned_tasks > 0 {
            warn!(
                orphaned = report.orphaned_tasks,
                repaired = report.repaired_tasks,
                "integrity sweep found orphaned tasks"
            );
        }
        if report.repaired_tasks > 0 && !self.set_tasks(&tasks) {
            report.repaired_tasks = 0;
        }
        report
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
