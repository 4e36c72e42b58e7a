//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{NewTask, Task};
use super::query::ListQuery;
use crate::Result;

/// Repository interface for task CRUD operations
///
/// Absent rows are reported through `Option`/`bool` results, never as
/// errors; errors are reserved for store faults.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Execute the listing pipeline: filter, sort, paginate
    async fn list(&self, query: &ListQuery) -> Result<Vec<Task>>;

    /// Get a task by id, `None` if absent
    async fn get(&self, id: i64) -> Result<Option<Task>>;

    /// Persist a new task; the store assigns the id
    async fn create(&self, new_task: NewTask) -> Result<Task>;

    /// Replace all mutable fields of the task with the given id
    ///
    /// Returns `None` when no row with that id exists.
    async fn update(&self, id: i64, fields: NewTask) -> Result<Option<Task>>;

    /// Delete the task with the given id
    ///
    /// Returns `false` when no row with that id exists; deleting a missing
    /// id is not an error.
    async fn delete(&self, id: i64) -> Result<bool>;
}
