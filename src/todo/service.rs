use chrono::DateTime;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    models::TodoModel,
    repository::TodoRepository,
    types::{
        AssignRequest, CreateTodoRequest, ListTodosQuery, TodoListParams, TodoPage,
        UpdateTitleRequest,
    },
};
use crate::shared::AppError;
use crate::user::{repository::UserRepository, validation::is_valid_email};

pub const TODO_NOT_FOUND_MESSAGE: &str = "No todo present";

fn not_found() -> AppError {
    AppError::NotFound(TODO_NOT_FOUND_MESSAGE.to_string())
}

/// Service for owner-scoped todo operations
pub struct TodoService {
    repository: Arc<dyn TodoRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl TodoService {
    pub fn new(
        repository: Arc<dyn TodoRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { repository, users }
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, owner: Uuid, request: CreateTodoRequest) -> Result<TodoModel, AppError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }

        let due_date = request
            .due_date
            .filter(|ts| *ts >= 0 && DateTime::from_timestamp(*ts, 0).is_some())
            .ok_or_else(|| AppError::Validation("Enter a valid unix timestamp".to_string()))?;

        let todo = TodoModel::new(owner, title.to_string(), due_date);
        self.repository.create_todo(&todo).await?;

        info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    /// Malformed ids are treated the same as ids that belong to someone else
    #[instrument(skip(self))]
    pub async fn get(&self, owner: Uuid, todo_id: &str) -> Result<TodoModel, AppError> {
        let id = Uuid::parse_str(todo_id).map_err(|_| {
            debug!("Todo id is not a UUID");
            not_found()
        })?;

        self.repository
            .get_todo(owner, id)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, owner: Uuid, query: ListTodosQuery) -> Result<TodoPage, AppError> {
        let params = TodoListParams::from(query);
        let (todos, total) = self.repository.list_todos(owner, &params).await?;

        debug!(returned = todos.len(), total, "Todos listed");
        Ok(TodoPage {
            todos,
            total,
            offset: params.offset,
            limit: params.limit,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner: Uuid, todo_id: &str) -> Result<(), AppError> {
        let todo = self.get(owner, todo_id).await?;
        if !self.repository.delete_todo(owner, todo.id).await? {
            return Err(not_found());
        }

        info!(todo_id = %todo.id, "Todo deleted");
        Ok(())
    }

    /// A blank title leaves the todo as it was
    #[instrument(skip(self, request))]
    pub async fn update_title(
        &self,
        owner: Uuid,
        todo_id: &str,
        request: UpdateTitleRequest,
    ) -> Result<TodoModel, AppError> {
        let mut todo = self.get(owner, todo_id).await?;

        let title = request.title.trim();
        if title.is_empty() {
            debug!(todo_id = %todo.id, "Empty title, nothing to update");
            return Ok(todo);
        }

        todo.title = title.to_string();
        self.save(todo).await
    }

    #[instrument(skip(self))]
    pub async fn set_completed(
        &self,
        owner: Uuid,
        todo_id: &str,
        completed: bool,
    ) -> Result<TodoModel, AppError> {
        let mut todo = self.get(owner, todo_id).await?;
        todo.completed = completed;
        self.save(todo).await
    }

    /// Assigns the todo to an email address. Addresses of registered users are
    /// skipped; those users are meant to be notified instead.
    #[instrument(skip(self, request))]
    pub async fn assign(
        &self,
        owner: Uuid,
        todo_id: &str,
        request: AssignRequest,
    ) -> Result<TodoModel, AppError> {
        let mut todo = self.get(owner, todo_id).await?;

        let assignee = request.assigned_to.trim();
        if assignee.is_empty() {
            return Ok(todo);
        }
        if !is_valid_email(assignee) {
            warn!(todo_id = %todo.id, "Rejected assignee address");
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        if self.users.find_by_email(assignee).await?.is_some() {
            // TODO: send the registered user a notification once outbound mail exists
            info!(todo_id = %todo.id, "Assignee is a registered user, assignment skipped");
            return Ok(todo);
        }

        todo.assigned_to = assignee.to_string();
        self.save(todo).await
    }

    async fn save(&self, mut todo: TodoModel) -> Result<TodoModel, AppError> {
        todo.touch();
        if !self.repository.update_todo(&todo).await? {
            return Err(not_found());
        }
        debug!(todo_id = %todo.id, "Todo saved");
        Ok(todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::repository::InMemoryTodoRepository;
    use crate::user::{models::UserModel, repository::InMemoryUserRepository};

    fn service() -> (TodoService, Arc<InMemoryUserRepository>) {
        let users = Arc::new(InMemoryUserRepository::new());
        let service = TodoService::new(Arc::new(InMemoryTodoRepository::new()), users.clone());
        (service, users)
    }

    fn create_request(title: &str, due_date: Option<i64>) -> CreateTodoRequest {
        CreateTodoRequest {
            title: title.to_string(),
            due_date,
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (service, _) = service();
        let owner = Uuid::new_v4();

        let created = service
            .create(owner, create_request("Buy milk", Some(1_700_000_000)))
            .await
            .unwrap();
        let fetched = service.get(owner, &created.id.to_string()).await.unwrap();

        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.due_date, 1_700_000_000);
        assert!(!fetched.completed);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, _) = service();
        let owner = Uuid::new_v4();

        for request in [
            create_request("   ", Some(1)),
            create_request("Buy milk", None),
            create_request("Buy milk", Some(-5)),
            create_request("Buy milk", Some(i64::MAX)),
        ] {
            let result = service.create(owner, request).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_foreign_and_malformed_ids_are_not_found() {
        let (service, _) = service();
        let owner = Uuid::new_v4();
        let todo = service
            .create(owner, create_request("Buy milk", Some(1)))
            .await
            .unwrap();
        let intruder = Uuid::new_v4();
        let id = todo.id.to_string();

        assert!(matches!(service.get(intruder, &id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(intruder, &id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.get(owner, "not-a-uuid").await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.get(owner, &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_title_ignores_blank() {
        let (service, _) = service();
        let owner = Uuid::new_v4();
        let todo = service
            .create(owner, create_request("Buy milk", Some(1)))
            .await
            .unwrap();
        let id = todo.id.to_string();

        let unchanged = service
            .update_title(owner, &id, UpdateTitleRequest { title: String::new() })
            .await
            .unwrap();
        assert_eq!(unchanged.title, "Buy milk");

        let renamed = service
            .update_title(owner, &id, UpdateTitleRequest { title: "Buy oat milk".to_string() })
            .await
            .unwrap();
        assert_eq!(renamed.title, "Buy oat milk");
        assert!(renamed.updated_at >= todo.updated_at);
    }

    #[tokio::test]
    async fn test_titles_are_stored_trimmed() {
        let (service, _) = service();
        let owner = Uuid::new_v4();
        let todo = service
            .create(owner, create_request("  Buy milk \n", Some(1)))
            .await
            .unwrap();
        assert_eq!(todo.title, "Buy milk");

        let renamed = service
            .update_title(
                owner,
                &todo.id.to_string(),
                UpdateTitleRequest { title: "\tBuy oat milk  ".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "Buy oat milk");
    }

    #[tokio::test]
    async fn test_check_and_uncheck() {
        let (service, _) = service();
        let owner = Uuid::new_v4();
        let id = service
            .create(owner, create_request("Buy milk", Some(1)))
            .await
            .unwrap()
            .id
            .to_string();

        assert!(service.set_completed(owner, &id, true).await.unwrap().completed);
        assert!(service.get(owner, &id).await.unwrap().completed);
        assert!(!service.set_completed(owner, &id, false).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_assign_rules() {
        let (service, users) = service();
        users
            .create_user(&UserModel::new(
                "bob".to_string(),
                "bob@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let owner = Uuid::new_v4();
        let id = service
            .create(owner, create_request("Buy milk", Some(1)))
            .await
            .unwrap()
            .id
            .to_string();
        let assign = |email: &str| AssignRequest {
            assigned_to: email.to_string(),
        };

        assert!(matches!(
            service.assign(owner, &id, assign("not-an-email")).await,
            Err(AppError::Validation(_))
        ));

        let skipped = service.assign(owner, &id, assign("bob@example.com")).await.unwrap();
        assert!(skipped.assigned_to.is_empty());

        let assigned = service
            .assign(owner, &id, assign("carol@example.com"))
            .await
            .unwrap();
        assert_eq!(assigned.assigned_to, "carol@example.com");

        let kept = service.assign(owner, &id, assign("")).await.unwrap();
        assert_eq!(kept.assigned_to, "carol@example.com");
    }
}
