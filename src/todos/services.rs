use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::services::non_blank,
    error::{AppError, AppResult},
    store::Store,
    todos::{
        dto::{CreateTodoRequest, UpdateTodoRequest},
        repo_types::{NewTodo, Todo, TodoChanges, DEFAULT_PRIORITY},
    },
};

// Missing and foreign todos get the same answer so ids of other users leak nothing.
fn todo_not_found() -> AppError {
    AppError::not_found("Todo not found")
}

fn parse_todo_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| todo_not_found())
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_deadline(raw: &str) -> AppResult<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| AppError::validation("Invalid deadline format"))
}

/// Fetches a todo and checks it belongs to `user_id`.
async fn find_owned(store: &dyn Store, user_id: Uuid, todo_id: Uuid) -> AppResult<Todo> {
    match store.find_todo(todo_id).await? {
        Some(todo) if todo.user_id == user_id => Ok(todo),
        Some(_) => {
            warn!(%user_id, %todo_id, "todo owned by another user");
            Err(todo_not_found())
        }
        None => Err(todo_not_found()),
    }
}

pub async fn list_all(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<Todo>> {
    Ok(store.list_todos(user_id).await?)
}

pub async fn get_by_id(store: &dyn Store, user_id: Uuid, todo_id: &str) -> AppResult<Todo> {
    let todo_id = parse_todo_id(todo_id)?;
    find_owned(store, user_id, todo_id).await
}

pub async fn create(store: &dyn Store, user_id: Uuid, req: CreateTodoRequest) -> AppResult<Todo> {
    let (Some(title), Some(deadline)) = (non_blank(req.title), non_blank(req.deadline)) else {
        return Err(AppError::validation("Title and deadline are required"));
    };
    let new = NewTodo {
        id: Uuid::new_v4(),
        user_id,
        title,
        description: req.description,
        priority: req.priority.unwrap_or(DEFAULT_PRIORITY),
        deadline: parse_deadline(&deadline)?,
    };
    let todo = store.insert_todo(new).await?;
    info!(%user_id, todo_id = %todo.id, "todo created");
    Ok(todo)
}

fn validate_changes(req: UpdateTodoRequest) -> AppResult<TodoChanges> {
    let title = match req.title.required("title")? {
        Some(t) if t.trim().is_empty() => return Err(AppError::validation("Title cannot be empty")),
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };
    let deadline = match req.deadline.required("deadline")? {
        Some(raw) => Some(parse_deadline(&raw)?),
        None => None,
    };
    Ok(TodoChanges {
        title,
        description: req.description,
        is_completed: req.is_completed.required("is_completed")?,
        priority: req.priority.required("priority")?,
        deadline,
    })
}

pub async fn update(
    store: &dyn Store,
    user_id: Uuid,
    todo_id: &str,
    req: UpdateTodoRequest,
) -> AppResult<()> {
    let todo_id = parse_todo_id(todo_id)?;
    // Ownership first: a stranger's malformed body still only sees 404.
    find_owned(store, user_id, todo_id).await?;
    let changes = validate_changes(req)?;
    if !store.update_todo(todo_id, user_id, changes).await? {
        return Err(todo_not_found());
    }
    info!(%user_id, %todo_id, "todo updated");
    Ok(())
}

pub async fn delete(store: &dyn Store, user_id: Uuid, todo_id: &str) -> AppResult<()> {
    let todo_id = parse_todo_id(todo_id)?;
    find_owned(store, user_id, todo_id).await?;
    if !store.delete_todo(todo_id, user_id).await? {
        return Err(todo_not_found());
    }
    info!(%user_id, %todo_id, "todo deleted");
    Ok(())
}
