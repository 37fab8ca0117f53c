//! Access to the `users` and `todos` tables.
//!
//! Handlers and services only see the [`Store`] trait; [`PgStore`] talks to
//! Postgres and [`MemoryStore`] keeps everything in process for tests.
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::todos::repo_types::{NewTodo, Todo, TodoChanges, TodoCounts};
use crate::users::repo_types::{NewUser, User, UserChanges};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Column guarded by a unique constraint on `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueField),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Returns `false` when no such user exists.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<bool, StoreError>;
    /// Returns `false` when no such user exists.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    async fn list_todos(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError>;
    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;
    async fn insert_todo(&self, todo: NewTodo) -> Result<Todo, StoreError>;
    /// Only touches a row owned by `user_id`; returns whether one was updated.
    async fn update_todo(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: TodoChanges,
    ) -> Result<bool, StoreError>;
    /// Only removes a row owned by `user_id`; returns whether one was deleted.
    async fn delete_todo(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
    async fn count_todos(&self, user_id: Uuid) -> Result<TodoCounts, StoreError>;
}
