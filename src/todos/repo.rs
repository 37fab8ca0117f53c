use sqlx::PgPool;
use uuid::Uuid;

use crate::todos::repo_types::{NewTodo, Todo, TodoChanges, TodoCounts};

const TODO_COLUMNS: &str =
    "id, title, description, is_completed, priority, deadline, user_id, created_at, updated_at";

impl Todo {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            r#"
            SELECT {TODO_COLUMNS}
              FROM todos
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Looks a todo up by id only; ownership is checked by the caller.
    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &PgPool, new: &NewTodo) -> Result<Todo, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (id, title, description, priority, deadline, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(new.id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.priority)
        .bind(new.deadline)
        .bind(new.user_id)
        .fetch_one(db)
        .await
    }

    pub async fn update_owned(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
        changes: TodoChanges,
    ) -> Result<bool, sqlx::Error> {
        let (touch_description, description) = changes.description.into_parts();
        let res = sqlx::query(
            r#"
            UPDATE todos
               SET title        = COALESCE($3, title),
                   description  = CASE WHEN $4::bool THEN $5::text ELSE description END,
                   is_completed = COALESCE($6, is_completed),
                   priority     = COALESCE($7, priority),
                   deadline     = COALESCE($8, deadline),
                   updated_at   = now()
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.title)
        .bind(touch_description)
        .bind(description)
        .bind(changes.is_completed)
        .bind(changes.priority)
        .bind(changes.deadline)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn counts_for_user(db: &PgPool, user_id: Uuid) -> Result<TodoCounts, sqlx::Error> {
        sqlx::query_as::<_, TodoCounts>(
            r#"
            SELECT COUNT(*)                                  AS total,
                   COUNT(*) FILTER (WHERE is_completed)      AS completed
              FROM todos
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await
    }
}
