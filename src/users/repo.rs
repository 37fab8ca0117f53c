use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserChanges};

const USER_COLUMNS: &str =
    "id, name, email, phone, username, password, profile_picture, created_at";

impl User {
    /// Find a user by primary key.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by login name.
    pub async fn find_by_username(
        db: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user; the unique constraints on username/email reject duplicates.
    pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, phone, username, password, profile_picture)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.profile_picture)
        .fetch_one(db)
        .await
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<bool, sqlx::Error> {
        let (touch_picture, picture) = changes.profile_picture.into_parts();
        let res = sqlx::query(
            r#"
            UPDATE users
               SET name            = COALESCE($2, name),
                   email           = COALESCE($3, email),
                   phone           = COALESCE($4, phone),
                   profile_picture = CASE WHEN $5::bool THEN $6::text ELSE profile_picture END
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(touch_picture)
        .bind(picture)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
