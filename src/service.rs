//! Service facade over the repository and query engine.
//!
//! The single write path for task mutations: validation happens here, and
//! persistence is refused with [`Error::Validation`] when it fails. The
//! facade borrows its repository so consumers inject their own instance;
//! there is no process-wide singleton.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::{is_valid_image_data_uri, ImageAttachment, ImageInput, Task, TaskPatch};
use crate::query::{QueryEngine, TaskFilters};
use crate::repository::Repository;

/// Facade adapting entities to and from the repository
#[derive(Debug, Clone, Copy)]
pub struct TaskService<'a> {
    repo: &'a Repository,
}

impl<'a> TaskService<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Validate and persist a draft task
    pub fn add(&self, draft: Task) -> Result<Task> {
        let errors = draft.validate();
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }
        self.repo
            .add_task(draft)
            .ok_or_else(|| Error::OperationFailed("task was not persisted".into()))
    }

    /// Fetch a single task
    pub fn get(&self, id: &str) -> Option<Task> {
        self.repo.get_task(id)
    }

    /// Apply a patch, validating the resulting record before persisting
    pub fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let mut preview = self
            .repo
            .get_task(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        patch.apply(&mut preview);
        let errors = preview.validate();
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        self.repo
            .update_task(id, patch)
            .ok_or_else(|| Error::OperationFailed("task was not persisted".into()))
    }

    /// Delete a task
    pub fn delete(&self, id: &str) -> Result<()> {
        if self.repo.get_task(id).is_none() {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        if !self.repo.delete_task(id) {
            return Err(Error::OperationFailed("task was not deleted".into()));
        }
        Ok(())
    }

    /// Flip completion state, maintaining the `completed_at` invariant
    pub fn toggle_completion(&self, id: &str) -> Result<Task> {
        let mut task = self
            .repo
            .get_task(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        task.toggle_completed(Utc::now());

        let patch = TaskPatch {
            completed: Some(task.completed),
            completed_at: Some(task.completed_at),
            ..TaskPatch::default()
        };
        self.repo
            .update_task(id, &patch)
            .ok_or_else(|| Error::OperationFailed("task was not persisted".into()))
    }

    /// Filtered, sorted task listing
    pub fn list(&self, filters: &TaskFilters) -> Vec<Task> {
        QueryEngine::new(self.repo).filtered_tasks(filters)
    }

    /// Normalize and attach an image to a task
    pub fn attach_image(&self, id: &str, input: ImageInput) -> Result<(Task, ImageAttachment)> {
        if !is_valid_image_data_uri(input.data_uri()) {
            return Err(Error::validation(vec![
                "Invalid image data URI".to_string()
            ]));
        }
        let mut task = self
            .repo
            .get_task(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let attachment = task.add_image(input, Utc::now());

        let patch = TaskPatch {
            images: Some(task.images.clone()),
            ..TaskPatch::default()
        };
        let updated = self
            .repo
            .update_task(id, &patch)
            .ok_or_else(|| Error::OperationFailed("task was not persisted".into()))?;
        Ok((updated, attachment))
    }

    /// Remove an image attachment by id
    pub fn remove_image(&self, id: &str, image_id: &str) -> Result<Task> {
        let mut task = self
            .repo
            .get_task(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        if !task.remove_image(image_id, Utc::now()) {
            return Err(Error::ImageNotFound(image_id.to_string()));
        }

        let patch = TaskPatch {
            images: Some(task.images.clone()),
            ..TaskPatch::default()
        };
        self.repo
            .update_task(id, &patch)
            .ok_or_else(|| Error::OperationFailed("task was not persisted".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_URI: &str = "data:image/png;base64,aGVsbG8=";

    fn setup(temp: &TempDir) -> Repository {
        Repository::open(temp.path().join("data")).unwrap()
    }

    #[test]
    fn add_refuses_invalid_drafts() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);

        let err = service.add(Task::new("")).unwrap_err();
        match err {
            Error::Validation { errors } => {
                assert!(errors.contains(&"Title is required".to_string()))
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert!(repo.tasks().is_empty());
    }

    #[test]
    fn update_validates_patched_record() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);

        let task = service.add(Task::new("fine")).unwrap();
        let patch = TaskPatch {
            title: Some(String::new()),
            ..TaskPatch::default()
        };
        assert!(matches!(
            service.update(&task.id, &patch),
            Err(Error::Validation { .. })
        ));
        // Refused update leaves the record alone
        assert_eq!(service.get(&task.id).unwrap().title, "fine");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);

        assert!(matches!(
            service.update("ghost", &TaskPatch::default()),
            Err(Error::TaskNotFound(_))
        ));
    }

    #[test]
    fn toggle_twice_restores_pending_state() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);

        let task = service.add(Task::new("flip me")).unwrap();
        let done = service.toggle_completion(&task.id).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let undone = service.toggle_completion(&task.id).unwrap();
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());
    }

    #[test]
    fn attach_and_remove_image() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);

        let task = service.add(Task::new("with image")).unwrap();
        let (task, attachment) = service
            .attach_image(&task.id, ImageInput::Data(PNG_URI.to_string()))
            .unwrap();
        assert_eq!(task.images.len(), 1);
        assert_eq!(attachment.kind, "image/png");

        let task = service.remove_image(&task.id, &attachment.id).unwrap();
        assert!(task.images.is_empty());

        assert!(matches!(
            service.remove_image(&task.id, "missing"),
            Err(Error::ImageNotFound(_))
        ));
    }

    #[test]
    fn attach_rejects_bad_data_uri() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);

        let task = service.add(Task::new("x")).unwrap();
        assert!(matches!(
            service.attach_image(&task.id, ImageInput::Data("nope".into())),
            Err(Error::Validation { .. })
        ));
        assert!(service.get(&task.id).unwrap().images.is_empty());
    }

    #[test]
    fn end_to_end_statistics_flow() {
        let temp = TempDir::new().unwrap();
        let repo = setup(&temp);
        let service = TaskService::new(&repo);
        let shopping = repo
            .categories()
            .into_iter()
            .find(|c| c.name == "Shopping")
            .unwrap();
        let normal = repo
            .priorities()
            .into_iter()
            .find(|p| p.name == "Normal")
            .unwrap();

        let mut draft = Task::new("Buy milk");
        draft.category_id = Some(shopping.id);
        draft.priority_id = Some(normal.id);
        let task = service.add(draft).unwrap();

        let engine = QueryEngine::new(&repo);
        let stats = engine.statistics();
        assert_eq!(stats.total_tasks, 1);
        assert_eq!(stats.completed_tasks, 0);
        assert_eq!(stats.pending_tasks, 1);

        service.toggle_completion(&task.id).unwrap();
        let stats = engine.statistics();
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 0);
    }
}
