//! Category entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{is_valid_hex_color, MAX_NAME_LEN};

/// A task category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Build a draft category; the repository assigns the real id and
    /// timestamp on persist.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }

    /// Validate structural rules; returns human-readable violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Category name is required".to_string());
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            errors.push(format!(
                "Category name must be at most {MAX_NAME_LEN} characters"
            ));
        }
        if !is_valid_hex_color(&self.color) {
            errors.push("Invalid color format".to_string());
        }

        errors
    }
}

/// Partial update for a category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryPatch {
    /// Apply supplied fields over the category
    pub fn apply(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(color) = &self.color {
            category.color = color.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_category() {
        assert!(Category::new("Work", "#3B82F6").validate().is_empty());
    }

    #[test]
    fn name_and_color_rules() {
        let cat = Category::new("", "#3B82F6");
        assert!(cat
            .validate()
            .contains(&"Category name is required".to_string()));

        let cat = Category::new("n".repeat(51), "#3B82F6");
        assert!(cat
            .validate()
            .iter()
            .any(|e| e.starts_with("Category name must be at most")));

        for bad in ["3B82F6", "#3B82F", "#3B82F6A", "#GGGGGG", "blue"] {
            let cat = Category::new("Work", bad);
            assert!(
                cat.validate().contains(&"Invalid color format".to_string()),
                "{bad}"
            );
        }

        // Lowercase hex is accepted
        assert!(Category::new("Work", "#3b82f6").validate().is_empty());
    }
}
