use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the todos table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoModel {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    /// Email of the assignee, empty when unassigned
    pub assigned_to: String,
    pub completed: bool,
    /// Unix seconds
    pub due_date: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoModel {
    /// Creates an open, unassigned todo with a generated ID
    pub fn new(owner: Uuid, title: String, due_date: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            title,
            assigned_to: String::new(),
            completed: false,
            due_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
