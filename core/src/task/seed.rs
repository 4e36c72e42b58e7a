//! Synthetic seed data
//!
//! One-time bootstrap that fills an empty store with numbered tasks so a
//! fresh deployment has something to page through. Idempotent: a store
//! with any existing rows is left untouched.

use chrono::{Duration, NaiveTime, Utc};

use super::model::{NewTask, TaskStatus};
use super::query::ListQuery;
use super::repository::TaskRepository;
use crate::Result;

/// Row count used by the server at startup
pub const DEFAULT_SEED_COUNT: u32 = 1100;

/// Populate the store with `count` synthetic tasks if it is empty
///
/// Statuses cycle through the three values by index and due dates spread
/// over the next 30 days. Returns the number of rows inserted: `count`
/// when seeding ran, 0 when the store already had rows.
pub async fn seed_if_empty(repository: &dyn TaskRepository, count: u32) -> Result<u32> {
    let existing = repository.list(&ListQuery::default()).await?;
    if !existing.is_empty() {
        return Ok(0);
    }

    tracing::debug!("seeding {} synthetic tasks", count);
    let today = Utc::now().date_naive();
    for i in 1..=count {
        let status = TaskStatus::from_ordinal(i64::from(i % 3)).unwrap_or_default();
        let due_date = (today + Duration::days(i64::from(i % 30)))
            .and_time(NaiveTime::MIN)
            .and_utc();
        repository
            .create(NewTask {
                title: format!("Task {}", i),
                description: format!("Synthetic description for task {}", i),
                status,
                due_date,
            })
            .await?;
    }

    Ok(count)
}
