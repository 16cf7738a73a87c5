// Public API - what other modules can use
pub use handlers::{
    assign_todo, check_todo, create_todo, delete_todo, get_todo, list_todos, uncheck_todo,
    update_todo_title,
};
pub use models::TodoModel;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
