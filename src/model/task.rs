//! Task entity: validation, due-date classification, completion toggling,
//! and image attachment helpers.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::image::{self, ImageAttachment, ImageInput};

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A single task.
///
/// Field names serialize in camelCase so snapshots interoperate with the
/// original application's export format. The due date is kept as the ISO
/// string it arrived as; [`Task::parsed_due_date`] is the one place it is
/// interpreted, and [`Task::validate`] reports the unparseable case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "image::deserialize_images"
    )]
    pub images: Vec<ImageAttachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Due-date classification against "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Overdue,
    Today,
    Tomorrow,
    /// 2 to 7 days ahead inclusive
    Soon,
    /// More than 7 days ahead
    Future,
}

impl DueStatus {
    /// Wire tag for this status, as used in filters and locale keys
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Overdue => "overdue",
            DueStatus::Today => "today",
            DueStatus::Tomorrow => "tomorrow",
            DueStatus::Soon => "soon",
            DueStatus::Future => "future",
        }
    }
}

impl std::str::FromStr for DueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overdue" => Ok(DueStatus::Overdue),
            "today" => Ok(DueStatus::Today),
            "tomorrow" => Ok(DueStatus::Tomorrow),
            "soon" => Ok(DueStatus::Soon),
            "future" => Ok(DueStatus::Future),
            other => Err(format!("unknown due-date status: {other}")),
        }
    }
}

impl Task {
    /// Build a draft task. The repository assigns the real id and
    /// timestamps when the draft is persisted.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            category_id: None,
            priority_id: None,
            completed: false,
            due_date: None,
            images: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Validate structural rules; returns human-readable violations.
    /// Never mutates the task.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            errors.push(format!("Title must be at most {MAX_TITLE_LEN} characters"));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "Description must be at most {MAX_DESCRIPTION_LEN} characters"
            ));
        }
        if self.due_date.is_some() && self.parsed_due_date().is_none() {
            errors.push("Invalid due date".to_string());
        }
        for att in &self.images {
            if !image::is_valid_image_data_uri(&att.data) {
                errors.push(format!("Invalid image data for attachment {}", att.id));
            }
        }

        errors
    }

    /// Parse the due date to a calendar day.
    ///
    /// Accepts `YYYY-MM-DD`; legacy snapshots store full ISO datetimes, so
    /// those are accepted too and truncated to the date.
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        raw.parse::<DateTime<Utc>>().ok().map(|dt| dt.date_naive())
    }

    /// Classify the due date against an injected "today".
    ///
    /// Both sides are calendar days already, so the difference is an exact
    /// day count with no time-of-day or DST artifacts.
    pub fn due_status(&self, today: NaiveDate) -> Option<DueStatus> {
        let due = self.parsed_due_date()?;
        let diff_days = (due - today).num_days();

        Some(match diff_days {
            d if d < 0 => DueStatus::Overdue,
            0 => DueStatus::Today,
            1 => DueStatus::Tomorrow,
            2..=7 => DueStatus::Soon,
            _ => DueStatus::Future,
        })
    }

    /// [`Task::due_status`] against the local calendar day
    pub fn due_status_now(&self) -> Option<DueStatus> {
        self.due_status(Local::now().date_naive())
    }

    /// Flip completion, maintaining the invariant that `completed_at` is
    /// set exactly while `completed` is true.
    pub fn toggle_completed(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
        self.updated_at = now;
    }

    /// Normalize and append an image attachment, stamping `updated_at`
    pub fn add_image(&mut self, input: ImageInput, now: DateTime<Utc>) -> ImageAttachment {
        let attachment = input.normalize(now);
        self.images.push(attachment.clone());
        self.updated_at = now;
        attachment
    }

    /// Remove an attachment by id; returns whether one was removed
    pub fn remove_image(&mut self, image_id: &str, now: DateTime<Utc>) -> bool {
        let before = self.images.len();
        self.images.retain(|att| att.id != image_id);
        let removed = self.images.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }
}

/// Partial update for a task.
///
/// Every mutable attribute is optional; nullable foreign keys and the due
/// date use a double `Option` so "clear the field" and "leave unchanged"
/// stay distinct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageAttachment>>,
}

impl TaskPatch {
    /// Apply supplied fields over the task, field by field
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(category_id) = &self.category_id {
            task.category_id = category_id.clone();
        }
        if let Some(priority_id) = &self.priority_id {
            task.priority_id = priority_id.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(images) = &self.images {
            task.images = images.clone();
        }
    }

    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.priority_id.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
            && self.completed_at.is_none()
            && self.images.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn valid_task_has_no_errors() {
        let mut task = Task::new("Buy milk");
        task.due_date = Some("2025-03-01".to_string());
        assert!(task.validate().is_empty());
    }

    #[test]
    fn title_rules() {
        let task = Task::new("   ");
        assert!(task.validate().contains(&"Title is required".to_string()));

        let task = Task::new("x".repeat(201));
        assert!(task
            .validate()
            .iter()
            .any(|e| e.starts_with("Title must be at most")));

        // Exactly at the limit is fine
        let task = Task::new("x".repeat(200));
        assert!(task.validate().is_empty());
    }

    #[test]
    fn description_limit() {
        let mut task = Task::new("ok");
        task.description = "y".repeat(1001);
        assert!(task
            .validate()
            .iter()
            .any(|e| e.starts_with("Description must be at most")));
    }

    #[test]
    fn unparseable_due_date_is_reported() {
        let mut task = Task::new("ok");
        task.due_date = Some("not-a-date".to_string());
        assert!(task.validate().contains(&"Invalid due date".to_string()));
    }

    #[test]
    fn legacy_datetime_due_date_parses() {
        let mut task = Task::new("ok");
        task.due_date = Some("2025-03-01T15:30:00.000Z".to_string());
        assert_eq!(task.parsed_due_date(), Some(day("2025-03-01")));
        assert!(task.validate().is_empty());
    }

    #[test]
    fn malformed_image_is_reported() {
        let mut task = Task::new("ok");
        task.images.push(ImageAttachment {
            id: "img-1".to_string(),
            data: "data:image/bmp;base64,xxxx".to_string(),
            kind: "image/bmp".to_string(),
            added_at: Utc::now(),
        });
        assert!(task
            .validate()
            .iter()
            .any(|e| e.contains("Invalid image data")));
    }

    #[test]
    fn due_status_classification() {
        let today = day("2025-06-15");
        let mut task = Task::new("ok");

        assert_eq!(task.due_status(today), None);

        let cases = [
            ("2025-06-14", DueStatus::Overdue),
            ("2025-06-15", DueStatus::Today),
            ("2025-06-16", DueStatus::Tomorrow),
            ("2025-06-17", DueStatus::Soon),
            ("2025-06-20", DueStatus::Soon),
            ("2025-06-22", DueStatus::Soon),
            ("2025-06-23", DueStatus::Future),
            ("2025-07-15", DueStatus::Future),
        ];
        for (date, expected) in cases {
            task.due_date = Some(date.to_string());
            assert_eq!(task.due_status(today), Some(expected), "{date}");
        }
    }

    #[test]
    fn toggle_completed_is_involutive() {
        let mut task = Task::new("ok");
        let now = Utc::now();

        task.toggle_completed(now);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));

        let later = now + Duration::seconds(5);
        task.toggle_completed(later);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn add_and_remove_image() {
        let mut task = Task::new("ok");
        let now = Utc::now();

        let att = task.add_image(
            ImageInput::Data("data:image/png;base64,aGVsbG8=".to_string()),
            now,
        );
        assert_eq!(task.images.len(), 1);
        assert_eq!(task.updated_at, now);

        let later = now + Duration::seconds(1);
        assert!(task.remove_image(&att.id, later));
        assert!(task.images.is_empty());
        assert_eq!(task.updated_at, later);

        // Removing an unknown id changes nothing
        assert!(!task.remove_image("missing", later + Duration::seconds(1)));
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn patch_distinguishes_clear_from_unchanged() {
        let mut task = Task::new("ok");
        task.category_id = Some("cat-1".to_string());
        task.priority_id = Some("pri-1".to_string());

        // Leave unchanged
        TaskPatch::default().apply(&mut task);
        assert_eq!(task.category_id.as_deref(), Some("cat-1"));

        // Clear explicitly
        let patch = TaskPatch {
            category_id: Some(None),
            ..TaskPatch::default()
        };
        patch.apply(&mut task);
        assert!(task.category_id.is_none());
        assert_eq!(task.priority_id.as_deref(), Some("pri-1"));
    }

    #[test]
    fn wire_format_is_camel_case() {
        let mut task = Task::new("ok");
        task.id = "t-1".to_string();
        task.category_id = Some("cat-1".to_string());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["categoryId"], "cat-1");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("category_id").is_none());
    }
}
