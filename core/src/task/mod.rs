//! Task module
//!
//! This module contains task-related types and logic.

mod model;
mod query;
mod repository;
mod seed;
mod service;
mod sqlite_store;
mod validate;

pub use model::*;
pub use query::*;
pub use repository::TaskRepository;
pub use seed::{seed_if_empty, DEFAULT_SEED_COUNT};
pub use service::TaskService;
pub use sqlite_store::SqliteTaskStore;
pub use validate::{validate, TaskInput, Violation, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
