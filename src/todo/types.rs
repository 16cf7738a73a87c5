use serde::{Deserialize, Serialize};

use super::models::TodoModel;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Request payload for POST /todo/create
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    pub due_date: Option<i64>,
}

/// Request payload for PATCH /todo/:id
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTitleRequest {
    #[serde(default)]
    pub title: String,
}

/// Request payload for PATCH /todo/:id/assign
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub assigned_to: String,
}

/// Columns a todo list may be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    DueDate,
    Completed,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::DueDate => "due_date",
            SortField::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Query string for GET /todo
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort: SortDirection,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListTodosQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: SortField::default(),
            sort: SortDirection::default(),
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Normalized list parameters handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct TodoListParams {
    /// Lowercased search term; `None` matches every title
    pub search: Option<String>,
    pub sort_by: SortField,
    pub direction: SortDirection,
    pub offset: i64,
    pub limit: i64,
}

impl From<ListTodosQuery> for TodoListParams {
    fn from(query: ListTodosQuery) -> Self {
        let search = query
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Self {
            search,
            sort_by: query.sort_by,
            direction: query.sort,
            offset: i64::from(query.offset),
            limit: i64::from(query.limit.min(MAX_PAGE_SIZE)),
        }
    }
}

/// One page of todos plus the total number of matches
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoPage {
    pub todos: Vec<TodoModel>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

/// Success envelope for todo endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn message_only(message: &str) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
            data: None,
        }
    }
}
