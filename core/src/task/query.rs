//! List query parameters
//!
//! Typed representation of the filter/sort/page inputs accepted by the
//! listing pipeline. Wire-level strings resolve through `from_param`
//! lookups; unrecognized values never raise an error.

use chrono::NaiveDate;

use super::model::TaskStatus;

/// Column used to order list results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Title,
    Status,
    DueDate,
}

impl SortField {
    /// Resolve a wire-level field name against the whitelist, case-insensitively.
    ///
    /// Unrecognized names fall back to ordering by id.
    pub fn from_param(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "title" => Self::Title,
            "status" => Self::Status,
            "duedate" => Self::DueDate,
            _ => Self::Id,
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Status => "status",
            Self::DueDate => "due_date",
        }
    }
}

/// Direction used to order list results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Resolve a wire-level order value.
    ///
    /// Only `"desc"` (case-insensitive) selects descending; anything else
    /// is ascending.
    pub fn from_param(order: &str) -> Self {
        if order.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Optional row filters, applied before sorting and pagination
///
/// An absent filter matches every row; a present filter that matches no
/// rows yields an empty result, which is not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    /// Exact status match
    pub status: Option<TaskStatus>,
    /// Calendar-date match; the time-of-day of stored values is ignored
    pub due_date: Option<NaiveDate>,
}

/// 1-based page selection, applied after filtering and sorting
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl PageRequest {
    /// Number of rows to skip: `(page - 1) * size`, saturating at zero
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }
}

/// Full input to the listing pipeline: filter, then sort, then paginate
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: TaskFilter,
    pub page: PageRequest,
    pub sort: SortField,
    pub order: SortOrder,
}
