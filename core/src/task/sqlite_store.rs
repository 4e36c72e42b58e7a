//! SQLite-backed task storage implementation
//!
//! Stores tasks in a single `tasks` table. The listing pipeline is
//! translated into one SQL statement: conditional `WHERE` clauses with
//! bound parameters, an `ORDER BY` column resolved from the closed
//! [`SortField`] whitelist, then `LIMIT`/`OFFSET`.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::model::{NewTask, Task, TaskStatus};
use super::query::ListQuery;
use super::repository::TaskRepository;
use crate::{Error, Result};

/// Raw `tasks` row; `due_date` is RFC 3339 text, `status` an ordinal
#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    status: i64,
    due_date: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let status = TaskStatus::from_ordinal(self.status).ok_or_else(|| {
            Error::Storage(format!(
                "unknown status ordinal {} for task {}",
                self.status, self.id
            ))
        })?;
        let due_date = DateTime::parse_from_rfc3339(&self.due_date)
            .map_err(|e| Error::Storage(format!("invalid due date for task {}: {}", self.id, e)))?
            .with_timezone(&Utc);

        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            status,
            due_date,
        })
    }
}

/// SQLite task store over a connection pool
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open (or create) a database file and run pending migrations
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", path.as_ref().display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory database, for tests
    ///
    /// A pooled `:memory:` database is per-connection, so the pool is
    /// capped at a single connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Task>> {
        let mut sql =
            String::from("SELECT id, title, description, status, due_date FROM tasks");

        let mut clauses: Vec<&str> = Vec::new();
        if query.filter.status.is_some() {
            clauses.push("status = ?");
        }
        if query.filter.due_date.is_some() {
            // due_date is RFC 3339 text; date() reduces it to the calendar date
            clauses.push("date(due_date) = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        // The column name comes from the closed SortField enum, never from
        // caller input.
        sql.push_str(" ORDER BY ");
        sql.push_str(query.sort.column());
        sql.push(' ');
        sql.push_str(query.order.keyword());
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut rows = sqlx::query_as::<_, TaskRow>(&sql);
        if let Some(status) = query.filter.status {
            rows = rows.bind(status.ordinal());
        }
        if let Some(date) = query.filter.due_date {
            rows = rows.bind(date.format("%Y-%m-%d").to_string());
        }
        let rows = rows
            .bind(i64::from(query.page.size))
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, title, description, status, due_date FROM tasks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaskRow::into_task).transpose()
    }

    async fn create(&self, new_task: NewTask) -> Result<Task> {
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, status, due_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.status.ordinal())
        .bind(new_task.due_date.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| Error::Storage(format!("task {} missing after insert", id)))
    }

    async fn update(&self, id: i64, fields: NewTask) -> Result<Option<Task>> {
        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, due_date = ? WHERE id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.status.ordinal())
        .bind(fields.due_date.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{PageRequest, SortField, SortOrder, TaskFilter};
    use chrono::{Datelike, NaiveDate, TimeZone};
    use tempfile::TempDir;

    async fn create_test_store() -> SqliteTaskStore {
        SqliteTaskStore::in_memory().await.unwrap()
    }

    fn draft(title: &str, status: TaskStatus, due_date: DateTime<Utc>) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: format!("{} description", title),
            status,
            due_date,
        }
    }

    fn due(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_round_trips() {
        let store = create_test_store().await;

        let created = store
            .create(draft("Test task", TaskStatus::InProgress, due(5, 12)))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.title, "Test task");
        assert_eq!(created.description, "Test task description");
        assert_eq!(created.status, TaskStatus::InProgress);
        assert_eq!(created.due_date, due(5, 12));

        let retrieved = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, created.id);
        assert_eq!(retrieved.title, created.title);
        assert_eq!(retrieved.description, created.description);
        assert_eq!(retrieved.status, created.status);
        assert_eq!(retrieved.due_date, created.due_date);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = create_test_store().await;
        assert!(store.get(424242).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_defaults_to_id_ascending_first_page() {
        let store = create_test_store().await;
        for i in 1..=15 {
            store
                .create(draft(&format!("Task {}", i), TaskStatus::Pending, due(1, 8)))
                .await
                .unwrap();
        }

        let tasks = store.list(&ListQuery::default()).await.unwrap();
        assert_eq!(tasks.len(), 10);
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_list_pagination_returns_contiguous_slice() {
        let store = create_test_store().await;
        for i in 1..=25 {
            store
                .create(draft(&format!("Task {}", i), TaskStatus::Pending, due(1, 8)))
                .await
                .unwrap();
        }

        let query = ListQuery {
            page: PageRequest { page: 3, size: 10 },
            ..ListQuery::default()
        };
        let tasks = store.list(&query).await.unwrap();
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, (21..=25).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_list_page_past_end_is_empty() {
        let store = create_test_store().await;
        store
            .create(draft("Only task", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();

        let query = ListQuery {
            page: PageRequest { page: 50, size: 10 },
            ..ListQuery::default()
        };
        assert!(store.list(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = create_test_store().await;
        store
            .create(draft("Pending task", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();
        store
            .create(draft("Done task", TaskStatus::Done, due(1, 8)))
            .await
            .unwrap();
        store
            .create(draft("Another done task", TaskStatus::Done, due(1, 8)))
            .await
            .unwrap();

        let query = ListQuery {
            filter: TaskFilter {
                status: Some(TaskStatus::Done),
                due_date: None,
            },
            ..ListQuery::default()
        };
        let tasks = store.list(&query).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Done));
    }

    #[tokio::test]
    async fn test_list_filters_by_calendar_date_ignoring_time() {
        let store = create_test_store().await;
        store
            .create(draft("Morning", TaskStatus::Pending, due(5, 8)))
            .await
            .unwrap();
        store
            .create(draft("Night", TaskStatus::Pending, due(5, 23)))
            .await
            .unwrap();
        store
            .create(draft("Next day", TaskStatus::Pending, due(6, 0)))
            .await
            .unwrap();

        let query = ListQuery {
            filter: TaskFilter {
                status: None,
                due_date: NaiveDate::from_ymd_opt(2025, 6, 5),
            },
            ..ListQuery::default()
        };
        let tasks = store.list(&query).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.due_date.date_naive().day() == 5));
    }

    #[tokio::test]
    async fn test_list_sorts_by_title_descending() {
        let store = create_test_store().await;
        for title in ["apple", "cherry", "banana"] {
            store
                .create(draft(title, TaskStatus::Pending, due(1, 8)))
                .await
                .unwrap();
        }

        let query = ListQuery {
            sort: SortField::from_param("title"),
            order: SortOrder::from_param("desc"),
            ..ListQuery::default()
        };
        let titles: Vec<String> = store
            .list(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["cherry", "banana", "apple"]);
    }

    #[tokio::test]
    async fn test_list_sorts_by_due_date() {
        let store = create_test_store().await;
        store
            .create(draft("Later", TaskStatus::Pending, due(20, 8)))
            .await
            .unwrap();
        store
            .create(draft("Soonest", TaskStatus::Pending, due(2, 8)))
            .await
            .unwrap();
        store
            .create(draft("Middle", TaskStatus::Pending, due(10, 8)))
            .await
            .unwrap();

        let query = ListQuery {
            sort: SortField::from_param("dueDate"),
            ..ListQuery::default()
        };
        let titles: Vec<String> = store
            .list(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["Soonest", "Middle", "Later"]);
    }

    #[tokio::test]
    async fn test_list_sorts_by_status_ordinal() {
        let store = create_test_store().await;
        store
            .create(draft("Finished", TaskStatus::Done, due(1, 8)))
            .await
            .unwrap();
        store
            .create(draft("Waiting", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();
        store
            .create(draft("Active", TaskStatus::InProgress, due(1, 8)))
            .await
            .unwrap();

        let query = ListQuery {
            sort: SortField::from_param("status"),
            ..ListQuery::default()
        };
        let statuses: Vec<TaskStatus> = store
            .list(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.status)
            .collect();
        assert_eq!(
            statuses,
            [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done]
        );
    }

    #[tokio::test]
    async fn test_list_unknown_sort_field_falls_back_to_id() {
        let store = create_test_store().await;
        // Reverse-alphabetical titles so id order differs from title order
        for title in ["zebra", "yak", "walrus"] {
            store
                .create(draft(title, TaskStatus::Pending, due(1, 8)))
                .await
                .unwrap();
        }

        let query = ListQuery {
            sort: SortField::from_param("priority"),
            order: SortOrder::from_param("desc"),
            ..ListQuery::default()
        };
        let ids: Vec<i64> = store
            .list(&query)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_filtered_sorted_page_scenario() {
        let store = create_test_store().await;
        // 20 tasks alternating Pending/Done; zero-padded titles keep title
        // order identical to id order.
        for i in 1..=20 {
            let status = if i % 2 == 1 {
                TaskStatus::Pending
            } else {
                TaskStatus::Done
            };
            store
                .create(draft(
                    &format!("task {:02}", i),
                    status,
                    due((i % 28) + 1, 8),
                ))
                .await
                .unwrap();
        }

        let query = ListQuery {
            filter: TaskFilter {
                status: Some(TaskStatus::Pending),
                due_date: None,
            },
            page: PageRequest { page: 2, size: 5 },
            sort: SortField::from_param("titulo"),
            order: SortOrder::from_param("asc"),
        };
        let tasks = store.list(&query).await.unwrap();

        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        // Items 6-10 of the filtered set (pending tasks have odd ids)
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, [11, 13, 15, 17, 19]);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let store = create_test_store().await;
        let created = store
            .create(draft("Original", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();

        let updated = store
            .update(
                created.id,
                NewTask {
                    title: "Replaced".to_string(),
                    description: "Replaced description".to_string(),
                    status: TaskStatus::Done,
                    due_date: due(28, 16),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Replaced");
        assert_eq!(updated.description, "Replaced description");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.due_date, due(28, 16));

        let retrieved = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "Replaced");
        assert_eq!(retrieved.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = create_test_store().await;
        let result = store
            .update(999, draft("Ghost", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = create_test_store().await;
        let created = store
            .create(draft("Task to delete", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();
        store
            .create(draft("Task to keep", TaskStatus::Pending, due(1, 8)))
            .await
            .unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());

        // Deleting again is a no-op, not an error
        assert!(!store.delete(created.id).await.unwrap());
        assert_eq!(store.list(&ListQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.db");

        let task_id;
        {
            let store = SqliteTaskStore::new(&path).await.unwrap();
            let created = store
                .create(draft("Persistent task", TaskStatus::InProgress, due(9, 9)))
                .await
                .unwrap();
            task_id = created.id;
        }

        {
            let store = SqliteTaskStore::new(&path).await.unwrap();
            let task = store.get(task_id).await.unwrap().unwrap();
            assert_eq!(task.title, "Persistent task");
            assert_eq!(task.status, TaskStatus::InProgress);
            assert_eq!(task.due_date, due(9, 9));
        }
    }
}
