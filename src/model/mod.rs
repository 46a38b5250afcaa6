//! Domain entities for tasktogo.
//!
//! Entities are value objects reconstructed from persisted plain data on
//! every read; the repository is the sole writer. Each entity exposes
//! `validate()` returning a list of human-readable rule violations, and a
//! `*Patch` struct carrying an explicit optional field per mutable
//! attribute.

mod category;
mod image;
mod priority;
mod task;

pub use category::{Category, CategoryPatch};
pub use image::{
    deserialize_images, infer_mime_type, is_valid_image_data_uri, ImageAttachment, ImageInput,
};
pub use priority::{Priority, PriorityPatch};
pub use task::{DueStatus, Task, TaskPatch, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

/// Maximum category/priority name length in characters
pub const MAX_NAME_LEN: usize = 50;

/// Check a 6-hex-digit color code (`#RRGGBB`, case-insensitive)
pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}
