use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, UniqueField};
use crate::todos::repo_types::{NewTodo, Todo, TodoChanges, TodoCounts};
use crate::users::repo_types::{NewUser, User, UserChanges};

/// In-process store with the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    todos: Vec<Todo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    /// Mirrors `users_username_key` / `users_email_key`; `skip` is the row being updated.
    /// Username is checked against every row before email.
    fn check_unique(
        &self,
        skip: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut others = self.users.iter().filter(|u| Some(u.id) != skip);
        if username.is_some_and(|n| others.clone().any(|u| n == u.username)) {
            return Err(StoreError::UniqueViolation(UniqueField::Username));
        }
        if email.is_some_and(|e| others.any(|u| e == u.email)) {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        t.check_unique(None, Some(new.username.as_str()), Some(new.email.as_str()))?;
        let user = User {
            id: new.id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            username: new.username,
            password_hash: new.password_hash,
            profile_picture: new.profile_picture,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == id) {
            return Ok(false);
        }
        t.check_unique(Some(id), None, changes.email.as_deref())?;
        if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
            changes.apply(user);
        }
        Ok(true)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_todos(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.todos.iter().filter(|td| td.user_id == user_id).cloned().collect())
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.todos.iter().find(|td| td.id == id).cloned())
    }

    async fn insert_todo(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let now = OffsetDateTime::now_utc();
        let todo = Todo {
            id: new.id,
            title: new.title,
            description: new.description,
            is_completed: false,
            priority: new.priority,
            deadline: new.deadline,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.todos.push(todo.clone());
        Ok(todo)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: TodoChanges,
    ) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t
            .todos
            .iter_mut()
            .find(|td| td.id == id && td.user_id == user_id)
        {
            Some(todo) => {
                changes.apply(todo, OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_todo(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.todos.len();
        t.todos.retain(|td| !(td.id == id && td.user_id == user_id));
        Ok(t.todos.len() < before)
    }

    async fn count_todos(&self, user_id: Uuid) -> Result<TodoCounts, StoreError> {
        let t = self.tables.read().await;
        let owned = t.todos.iter().filter(|td| td.user_id == user_id);
        let (total, completed) = owned.fold((0, 0), |(total, done), td| {
            (total + 1, done + i64::from(td.is_completed))
        });
        Ok(TodoCounts { total, completed })
    }
}
