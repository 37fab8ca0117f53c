use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::patch::Patch;

pub const DEFAULT_PRIORITY: i32 = 5;

/// Todo record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub priority: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub deadline: OffsetDateTime,
}

/// Validated todo changes; `None` / `Patch::Absent` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Patch<String>,
    pub is_completed: Option<bool>,
    pub priority: Option<i32>,
    pub deadline: Option<OffsetDateTime>,
}

impl TodoChanges {
    pub(crate) fn apply(self, todo: &mut Todo, now: OffsetDateTime) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        self.description.apply_to(&mut todo.description);
        if let Some(done) = self.is_completed {
            todo.is_completed = done;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            todo.deadline = deadline;
        }
        todo.updated_at = now;
    }
}

/// Raw per-user counters the profile statistics are derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct TodoCounts {
    pub total: i64,
    pub completed: i64,
}
