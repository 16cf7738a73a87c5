use async_trait::async_trait;
use sqlx::PgPool;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{
    models::TodoModel,
    types::{SortDirection, SortField, TodoListParams},
};
use crate::shared::AppError;

/// Trait for todo repository operations. Every lookup is scoped to an owner.
#[async_trait]
pub trait TodoRepository {
    async fn create_todo(&self, todo: &TodoModel) -> Result<(), AppError>;
    async fn get_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<TodoModel>, AppError>;

    /// Returns the requested page and the total number of matching todos
    async fn list_todos(
        &self,
        owner: Uuid,
        params: &TodoListParams,
    ) -> Result<(Vec<TodoModel>, i64), AppError>;

    /// Persists the mutable fields of an existing todo; false if it no longer exists
    async fn update_todo(&self, todo: &TodoModel) -> Result<bool, AppError>;

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}

/// In-memory implementation of TodoRepository for development and testing
pub struct InMemoryTodoRepository {
    todos: Mutex<HashMap<Uuid, TodoModel>>,
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            todos: Mutex::new(HashMap::new()),
        }
    }

    pub fn todo_count(&self) -> usize {
        self.todos.lock().map(|todos| todos.len()).unwrap_or(0)
    }
}

fn compare_by(field: SortField, a: &TodoModel, b: &TodoModel) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::DueDate => a.due_date.cmp(&b.due_date),
        SortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    #[instrument(skip(self, todo), fields(todo_id = %todo.id))]
    async fn create_todo(&self, todo: &TodoModel) -> Result<(), AppError> {
        let mut todos = self.todos.lock().map_err(|_| AppError::Internal)?;
        todos.insert(todo.id, todo.clone());
        debug!("Todo created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<TodoModel>, AppError> {
        let todos = self.todos.lock().map_err(|_| AppError::Internal)?;
        Ok(todos.get(&id).filter(|todo| todo.owner == owner).cloned())
    }

    #[instrument(skip(self))]
    async fn list_todos(
        &self,
        owner: Uuid,
        params: &TodoListParams,
    ) -> Result<(Vec<TodoModel>, i64), AppError> {
        let todos = self.todos.lock().map_err(|_| AppError::Internal)?;

        let mut matching: Vec<TodoModel> = todos
            .values()
            .filter(|todo| todo.owner == owner)
            .filter(|todo| match &params.search {
                Some(term) => todo.title.to_lowercase().contains(term.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare_by(params.sort_by, a, b).then_with(|| a.id.cmp(&b.id));
            match params.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(params.offset.max(0) as usize)
            .take(params.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    #[instrument(skip(self, todo), fields(todo_id = %todo.id))]
    async fn update_todo(&self, todo: &TodoModel) -> Result<bool, AppError> {
        let mut todos = self.todos.lock().map_err(|_| AppError::Internal)?;
        match todos.get_mut(&todo.id) {
            Some(existing) if existing.owner == todo.owner => {
                existing.title = todo.title.clone();
                existing.assigned_to = todo.assigned_to.clone();
                existing.completed = todo.completed;
                existing.updated_at = todo.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut todos = self.todos.lock().map_err(|_| AppError::Internal)?;
        if todos.get(&id).is_some_and(|todo| todo.owner == owner) {
            todos.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

/// PostgreSQL implementation of todo repository
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TODO_COLUMNS: &str =
    "id, owner, title, assigned_to, completed, due_date, created_at, updated_at";

const SEARCH_FILTER: &str = "owner = $1 AND ($2::text IS NULL OR strpos(lower(title), $2) > 0)";

/// Titles sort case-insensitively by code point, matching the in-memory store
fn order_expression(field: SortField) -> &'static str {
    match field {
        SortField::Title => r#"lower(title) COLLATE "C""#,
        other => other.column(),
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "{}", context);
        AppError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[instrument(skip(self, todo), fields(todo_id = %todo.id))]
    async fn create_todo(&self, todo: &TodoModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO todos (id, owner, title, assigned_to, completed, due_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(todo.id)
        .bind(todo.owner)
        .bind(&todo.title)
        .bind(&todo.assigned_to)
        .bind(todo.completed)
        .bind(todo.due_date)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create todo in database"))?;

        debug!("Todo created in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<TodoModel>, AppError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1 AND owner = $2", TODO_COLUMNS);
        sqlx::query_as::<_, TodoModel>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch todo from database"))
    }

    #[instrument(skip(self))]
    async fn list_todos(
        &self,
        owner: Uuid,
        params: &TodoListParams,
    ) -> Result<(Vec<TodoModel>, i64), AppError> {
        // Column and direction come from closed enums, never from raw input
        let direction = params.direction.keyword();
        let sql = format!(
            "SELECT {} FROM todos WHERE {} ORDER BY {} {}, id {} LIMIT $3 OFFSET $4",
            TODO_COLUMNS,
            SEARCH_FILTER,
            order_expression(params.sort_by),
            direction,
            direction
        );

        let todos = sqlx::query_as::<_, TodoModel>(&sql)
            .bind(owner)
            .bind(params.search.as_deref())
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list todos from database"))?;

        let count_sql = format!("SELECT COUNT(*) FROM todos WHERE {}", SEARCH_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(owner)
            .bind(params.search.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count todos in database"))?;

        Ok((todos, total))
    }

    #[instrument(skip(self, todo), fields(todo_id = %todo.id))]
    async fn update_todo(&self, todo: &TodoModel) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE todos SET title = $1, assigned_to = $2, completed = $3, updated_at = $4 \
             WHERE id = $5 AND owner = $6",
        )
        .bind(&todo.title)
        .bind(&todo.assigned_to)
        .bind(todo.completed)
        .bind(todo.updated_at)
        .bind(todo.id)
        .bind(todo.owner)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update todo in database"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete todo from database"))?;

        Ok(result.rows_affected() > 0)
    }
}
