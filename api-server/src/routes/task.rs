//! Task API endpoints
//!
//! RESTful API for task CRUD operations, with filtering, sorting and
//! pagination on the list endpoint and navigation links on every task
//! representation.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use tm_core::task::{
    ListQuery, PageRequest, SortField, SortOrder, Task, TaskFilter, TaskInput, TaskStatus,
    Violation,
};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "de_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date; only the
/// calendar date takes part in filtering.
fn de_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else { return Ok(None) };

    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(&raw, "%Y-%m-%d"))
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid due date filter: {}", raw)))
}

/// Navigation link attached to a task representation
#[derive(Debug, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: &'static str,
    pub method: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: String,
    pub links: Vec<Link>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        let links = task_links(task.id);
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            due_date: task.due_date.to_rfc3339(),
            links,
        }
    }
}

/// Links for a task representation: self, update, delete
fn task_links(id: i64) -> Vec<Link> {
    let href = format!("/tasks/{}", id);
    vec![
        Link {
            href: href.clone(),
            rel: "self",
            method: "GET",
        },
        Link {
            href: href.clone(),
            rel: "update",
            method: "PUT",
        },
        Link {
            href,
            rel: "delete",
            method: "DELETE",
        },
    ]
}

/// Structured error payload returned on failure
///
/// Validation failures additionally carry the per-field violations.
#[derive(Debug, Serialize)]
pub struct ProblemDetail {
    pub title: String,
    pub detail: String,
    pub status: u16,
    pub instance: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl ProblemDetail {
    fn not_found(
        detail: impl Into<String>,
        instance: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (
            StatusCode::NOT_FOUND,
            Json(Self {
                title: "Task not found".to_string(),
                detail: detail.into(),
                status: StatusCode::NOT_FOUND.as_u16(),
                instance: instance.into(),
                violations: Vec::new(),
            }),
        )
    }

    fn validation(
        instance: impl Into<String>,
        violations: Vec<Violation>,
    ) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                title: "Invalid input".to_string(),
                detail: "One or more fields are invalid.".to_string(),
                status: StatusCode::BAD_REQUEST.as_u16(),
                instance: instance.into(),
                violations,
            }),
        )
    }
}

fn internal_error(
    error: impl std::fmt::Display,
    instance: &str,
) -> (StatusCode, Json<ProblemDetail>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ProblemDetail {
            title: "Internal server error".to_string(),
            detail: error.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            instance: instance.to_string(),
            violations: Vec::new(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - List tasks with optional filtering, sorting and pagination
async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, (StatusCode, Json<ProblemDetail>)> {
    let query = ListQuery {
        filter: TaskFilter {
            status: params.status,
            due_date: params.due_date,
        },
        page: PageRequest {
            page: params.page.unwrap_or(1),
            size: params.page_size.unwrap_or(10),
        },
        sort: params
            .sort_by
            .as_deref()
            .map(SortField::from_param)
            .unwrap_or_default(),
        order: params
            .order
            .as_deref()
            .map(SortOrder::from_param)
            .unwrap_or_default(),
    };

    let tasks = state
        .service()
        .list(&query)
        .await
        .map_err(|e| internal_error(e, "/tasks"))?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// GET /tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, (StatusCode, Json<ProblemDetail>)> {
    let instance = format!("/tasks/{}", id);
    let task = state
        .service()
        .get(id)
        .await
        .map_err(|e| internal_error(e, &instance))?;

    match task {
        Some(task) => Ok(Json(TaskResponse::from(task))),
        None => Err(ProblemDetail::not_found(
            format!("No task with id {} was found.", id),
            instance,
        )),
    }
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> Result<
    (StatusCode, [(header::HeaderName, String); 1], Json<TaskResponse>),
    (StatusCode, Json<ProblemDetail>),
> {
    let new_task = input
        .into_new_task()
        .map_err(|violations| ProblemDetail::validation("/tasks", violations))?;

    let created = state
        .service()
        .create(new_task)
        .await
        .map_err(|e| internal_error(e, "/tasks"))?;

    let location = format!("/tasks/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TaskResponse::from(created)),
    ))
}

/// PUT /tasks/{id} - Replace all mutable fields of a task
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TaskInput>,
) -> Result<StatusCode, (StatusCode, Json<ProblemDetail>)> {
    let instance = format!("/tasks/{}", id);
    let fields = input
        .into_new_task()
        .map_err(|violations| ProblemDetail::validation(instance.clone(), violations))?;

    let updated = state
        .service()
        .update(id, fields)
        .await
        .map_err(|e| internal_error(e, &instance))?;

    match updated {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ProblemDetail::not_found(
            format!("Could not update. No task with id {} was found.", id),
            instance,
        )),
    }
}

/// DELETE /tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ProblemDetail>)> {
    let instance = format!("/tasks/{}", id);
    let deleted = state
        .service()
        .delete(id)
        .await
        .map_err(|e| internal_error(e, &instance))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ProblemDetail::not_found(
            format!("Could not delete. No task with id {} was found.", id),
            instance,
        ))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
