//! Task service
//!
//! Pass-through orchestration layer between the HTTP interface and the
//! repository. Adds no business rules; exists so the interface layer
//! depends on a seam that tests can substitute.

use std::sync::Arc;

use super::model::{NewTask, Task};
use super::query::ListQuery;
use super::repository::TaskRepository;
use crate::Result;

/// Forwards each operation to the underlying repository
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Task>> {
        self.repository.list(query).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Task>> {
        self.repository.get(id).await
    }

    pub async fn create(&self, new_task: NewTask) -> Result<Task> {
        self.repository.create(new_task).await
    }

    pub async fn update(&self, id: i64, fields: NewTask) -> Result<Option<Task>> {
        self.repository.update(id, fields).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.repository.delete(id).await
    }
}
