//! Application state

use std::path::Path;
use std::sync::Arc;

use tm_core::task::{SqliteTaskStore, TaskRepository, TaskService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    service: TaskService,
}

impl AppState {
    /// Create a new AppState backed by a SQLite database at the given path
    pub async fn new(db_path: impl AsRef<Path>) -> tm_core::Result<Self> {
        let store = SqliteTaskStore::new(db_path).await?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Create an AppState over an existing repository
    pub fn with_store(store: Arc<dyn TaskRepository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                service: TaskService::new(store),
            }),
        }
    }

    /// Get reference to the task service
    pub fn service(&self) -> &TaskService {
        &self.inner.service
    }
}
