//! Client-side internationalization.
//!
//! Locale dictionaries are nested JSON objects compiled into the binary.
//! Lookups take dot-separated key paths (`task.dueToday`) and fall back to
//! the literal key when any path segment is missing, so a missing
//! translation degrades to something readable instead of failing.

use serde_json::Value;
use tracing::warn;

use crate::model::DueStatus;

const LOCALE_EN: &str = include_str!("../locales/en.json");
const LOCALE_IT: &str = include_str!("../locales/it.json");

/// Language codes with a bundled dictionary
pub const AVAILABLE_LANGUAGES: [&str; 2] = ["en", "it"];

/// Fallback language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Dictionary-backed string lookup for one language
#[derive(Debug, Clone)]
pub struct I18nService {
    language: String,
    translations: Value,
}

impl I18nService {
    /// Load the dictionary for a language code, falling back to English
    /// for unknown codes.
    pub fn load(language: &str) -> Self {
        let code = language.trim().to_ascii_lowercase();
        let (language, raw) = match code.as_str() {
            "it" => ("it", LOCALE_IT),
            "en" => ("en", LOCALE_EN),
            other => {
                if !other.is_empty() {
                    warn!(language = other, "no dictionary for language, using en");
                }
                ("en", LOCALE_EN)
            }
        };

        // Bundled dictionaries are validated by tests; an empty object is
        // the safe degradation if one is ever malformed.
        let translations = serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(%err, language, "failed to parse bundled dictionary");
            Value::Object(serde_json::Map::new())
        });

        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Current language code
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Resolve a dot-separated key path, falling back to the literal key
    pub fn t(&self, key: &str) -> String {
        let mut node = &self.translations;
        for segment in key.split('.') {
            match node.get(segment) {
                Some(child) => node = child,
                None => return key.to_string(),
            }
        }
        match node.as_str() {
            Some(text) => text.to_string(),
            None => key.to_string(),
        }
    }

    /// Human label for a due-date status
    pub fn due_label(&self, status: DueStatus) -> String {
        let key = match status {
            DueStatus::Overdue => "task.overdue",
            DueStatus::Today => "task.dueToday",
            DueStatus::Tomorrow => "task.dueTomorrow",
            DueStatus::Soon => "task.soon",
            DueStatus::Future => "task.future",
        };
        self.t(key)
    }
}

impl Default for I18nService {
    fn default() -> Self {
        Self::load(DEFAULT_LANGUAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dictionaries_parse() {
        for lang in AVAILABLE_LANGUAGES {
            let i18n = I18nService::load(lang);
            assert_eq!(i18n.language(), lang);
            assert!(i18n.translations.is_object());
        }
    }

    #[test]
    fn dot_path_lookup() {
        let i18n = I18nService::load("en");
        assert_eq!(i18n.t("task.dueToday"), "Due today");
        assert_eq!(i18n.t("messages.success"), "Operation completed successfully");
    }

    #[test]
    fn missing_path_falls_back_to_key() {
        let i18n = I18nService::load("en");
        assert_eq!(i18n.t("task.noSuchKey"), "task.noSuchKey");
        assert_eq!(i18n.t("nope.nested.deeper"), "nope.nested.deeper");
        // A non-leaf node is not a translation either
        assert_eq!(i18n.t("task"), "task");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let i18n = I18nService::load("de");
        assert_eq!(i18n.language(), "en");
        assert_eq!(i18n.t("task.overdue"), "Overdue");
    }

    #[test]
    fn italian_dictionary_differs() {
        let i18n = I18nService::load("it");
        assert_eq!(i18n.t("task.dueToday"), "Scade oggi");
        assert_eq!(i18n.due_label(DueStatus::Overdue), "In ritardo");
    }
}
