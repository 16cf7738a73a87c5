use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{
    models::TodoModel,
    types::{
        ApiResponse, AssignRequest, CreateTodoRequest, ListTodosQuery, TodoPage,
        UpdateTitleRequest,
    },
};
use crate::session::AuthenticatedUser;
use crate::shared::{AppError, AppState};

const REVIEW_INPUT_MESSAGE: &str = "Review your input";

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "Unreadable todo body");
        AppError::Validation(REVIEW_INPUT_MESSAGE.to_string())
    })
}

/// HTTP handler for creating a todo
///
/// POST /api/todo/create
#[instrument(name = "create_todo", skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TodoModel>>, AppError> {
    let request = json_body(payload)?;
    let todo = state.todo_service().create(user.user_id, request).await?;

    Ok(Json(ApiResponse::success("Created todo", todo)))
}

/// HTTP handler for fetching one todo
///
/// GET /api/todo/:todo_id
#[instrument(name = "get_todo", skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(todo_id): Path<String>,
) -> Result<Json<ApiResponse<TodoModel>>, AppError> {
    let todo = state.todo_service().get(user.user_id, &todo_id).await?;
    Ok(Json(ApiResponse::success("todo Found", todo)))
}

/// HTTP handler for listing the caller's todos
///
/// GET /api/todo?search=&sortBy=&sort=&offset=&limit=
#[instrument(name = "list_todos", skip(state, query))]
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<ListTodosQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TodoPage>>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection, "Invalid list query");
        AppError::Validation("Invalid query parameters".to_string())
    })?;

    let page = state.todo_service().list(user.user_id, query).await?;
    info!(returned = page.todos.len(), total = page.total, "Todos listed");

    Ok(Json(ApiResponse::success("todos Found", page)))
}

/// HTTP handler for deleting a todo
///
/// DELETE /api/todo/:todo_id
#[instrument(name = "delete_todo", skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(todo_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.todo_service().delete(user.user_id, &todo_id).await?;
    Ok(Json(ApiResponse::message_only("Deleted Todo")))
}

/// HTTP handler for renaming a todo
///
/// PATCH /api/todo/:todo_id
#[instrument(name = "update_todo_title", skip(state, payload))]
pub async fn update_todo_title(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(todo_id): Path<String>,
    payload: Result<Json<UpdateTitleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TodoModel>>, AppError> {
    let service = state.todo_service();
    // Ownership is checked before the body so foreign ids stay 404
    service.get(user.user_id, &todo_id).await?;
    let request = json_body(payload)?;

    let todo = service.update_title(user.user_id, &todo_id, request).await?;
    Ok(Json(ApiResponse::success("Todo Updated", todo)))
}

/// PATCH /api/todo/:todo_id/check
#[instrument(name = "check_todo", skip(state))]
pub async fn check_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(todo_id): Path<String>,
) -> Result<Json<ApiResponse<TodoModel>>, AppError> {
    let todo = state
        .todo_service()
        .set_completed(user.user_id, &todo_id, true)
        .await?;
    Ok(Json(ApiResponse::success("Todo Completed", todo)))
}

/// PATCH /api/todo/:todo_id/uncheck
#[instrument(name = "uncheck_todo", skip(state))]
pub async fn uncheck_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(todo_id): Path<String>,
) -> Result<Json<ApiResponse<TodoModel>>, AppError> {
    let todo = state
        .todo_service()
        .set_completed(user.user_id, &todo_id, false)
        .await?;
    Ok(Json(ApiResponse::success("Todo Unchecked", todo)))
}

/// HTTP handler for assigning a todo to an email address
///
/// PATCH /api/todo/:todo_id/assign
#[instrument(name = "assign_todo", skip(state, payload))]
pub async fn assign_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(todo_id): Path<String>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TodoModel>>, AppError> {
    let service = state.todo_service();
    service.get(user.user_id, &todo_id).await?;
    let request = json_body(payload)?;

    let todo = service.assign(user.user_id, &todo_id, request).await?;
    Ok(Json(ApiResponse::success("Todo Assigned", todo)))
}
