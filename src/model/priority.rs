//! Priority entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{is_valid_hex_color, MAX_NAME_LEN};

/// A task priority with a display/sort rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Positive sort rank; lower sorts first
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

impl Priority {
    /// Build a draft priority; the repository assigns the real id and
    /// timestamp on persist, and a default order when 0.
    pub fn new(name: impl Into<String>, color: impl Into<String>, order: u32) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            color: color.into(),
            order,
            created_at: Utc::now(),
        }
    }

    /// Validate structural rules; returns human-readable violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Priority name is required".to_string());
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            errors.push(format!(
                "Priority name must be at most {MAX_NAME_LEN} characters"
            ));
        }
        if !is_valid_hex_color(&self.color) {
            errors.push("Invalid color format".to_string());
        }
        if self.order == 0 {
            errors.push("Order must be a positive integer".to_string());
        }

        errors
    }
}

/// Partial update for a priority
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl PriorityPatch {
    /// Apply supplied fields over the priority
    pub fn apply(&self, priority: &mut Priority) {
        if let Some(name) = &self.name {
            priority.name = name.clone();
        }
        if let Some(color) = &self.color {
            priority.color = color.clone();
        }
        if let Some(order) = self.order {
            priority.order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_priority() {
        assert!(Priority::new("High", "#EF4444", 1).validate().is_empty());
    }

    #[test]
    fn zero_order_is_rejected() {
        let pri = Priority::new("High", "#EF4444", 0);
        assert!(pri
            .validate()
            .contains(&"Order must be a positive integer".to_string()));
    }

    #[test]
    fn name_rules_match_category_rules() {
        let pri = Priority::new(" ", "#EF4444", 1);
        assert!(pri
            .validate()
            .contains(&"Priority name is required".to_string()));

        let pri = Priority::new("n".repeat(51), "#EF4444", 1);
        assert!(pri
            .validate()
            .iter()
            .any(|e| e.starts_with("Priority name must be at most")));
    }
}
