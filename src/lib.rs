//! tasktogo - local-first task management
//!
//! Tasks with categories, priorities, due dates and image attachments,
//! persisted as JSON collections under fixed keys in a local data
//! directory. The crate exposes the storage layer (`store`, `repository`),
//! the domain model (`model`), the query/statistics engine (`query`), the
//! validated write path (`service`), snapshot import/export, translations
//! (`i18n`) and a periodic backup scheduler (`backup`), plus the CLI built
//! on top of them.

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod output;
pub mod query;
pub mod repository;
pub mod service;
pub mod store;

pub use error::{Error, Result};
