use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        services::normalize_email,
    },
    error::{AppError, AppResult},
    store::{Store, StoreError, UniqueField},
    users::{
        dto::{ChangePasswordRequest, ProfileResponse, Statistics, UpdateProfileRequest},
        repo_types::UserChanges,
    },
};

fn user_not_found() -> AppError {
    AppError::not_found("User not found")
}

/// Profile plus statistics derived from the user's todos.
pub async fn get_profile(store: &dyn Store, user_id: Uuid) -> AppResult<ProfileResponse> {
    // A valid token can outlive its account, so a missing row is still possible.
    let Some(user) = store.find_user_by_id(user_id).await? else {
        warn!(%user_id, "authenticated user has no row");
        return Err(user_not_found());
    };
    let counts = store.count_todos(user_id).await?;
    Ok(ProfileResponse {
        user,
        statistics: Statistics::from(counts),
    })
}

fn non_empty(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(AppError::validation(format!("{field} cannot be empty")))
        }
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

fn validate_changes(req: UpdateProfileRequest) -> AppResult<UserChanges> {
    let email = match non_empty("email", req.email.required("email")?)? {
        Some(raw) => Some(normalize_email(&raw)?),
        None => None,
    };
    Ok(UserChanges {
        name: non_empty("name", req.name.required("name")?)?,
        email,
        phone: non_empty("phone", req.phone.required("phone")?)?,
        profile_picture: req.profile_picture.map(|p| p.trim().to_string()),
    })
}

pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> AppResult<()> {
    let changes = validate_changes(req)?;

    if changes.is_empty() {
        return match store.find_user_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(user_not_found()),
        };
    }

    let updated = store
        .update_user(user_id, changes)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(UniqueField::Email) => {
                warn!(%user_id, "profile email already taken");
                AppError::Conflict("Email already in use".into())
            }
            other => other.into(),
        })?;
    if !updated {
        return Err(user_not_found());
    }
    info!(%user_id, "profile updated");
    Ok(())
}

pub async fn change_password(
    store: &dyn Store,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> AppResult<()> {
    let current = req.current_password.filter(|p| !p.is_empty());
    let new = req.new_password.filter(|p| !p.is_empty());
    let (Some(current), Some(new)) = (current, new) else {
        return Err(AppError::validation(
            "Current password and new password are required",
        ));
    };

    let Some(user) = store.find_user_by_id(user_id).await? else {
        return Err(user_not_found());
    };

    if !verify_password(&current, &user.password_hash)? {
        warn!(%user_id, "change password with wrong current password");
        return Err(AppError::Unauthenticated(
            "Current password is incorrect".into(),
        ));
    }

    let hash = hash_password(&new)?;
    if !store.update_password(user_id, &hash).await? {
        return Err(user_not_found());
    }
    info!(%user_id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        services as auth,
    };
    use crate::config::JwtConfig;
    use crate::patch::Patch;
    use crate::store::MemoryStore;
    use crate::todos::{dto::CreateTodoRequest, dto::UpdateTodoRequest, services as todos};

    async fn register(store: &MemoryStore, username: &str, email: &str, password: &str) -> Uuid {
        let req = RegisterRequest {
            name: Some(format!("{username} name")),
            email: Some(email.into()),
            phone: Some("555-0100".into()),
            username: Some(username.into()),
            password: Some(password.into()),
            profile_picture: Some("https://img.example/p.png".into()),
        };
        auth::register(store, req).await.unwrap().id
    }

    fn change(current: &str, new: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            current_password: Some(current.into()),
            new_password: Some(new.into()),
        }
    }

    async fn can_login(store: &MemoryStore, username: &str, password: &str) -> bool {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: 5,
        });
        let req = LoginRequest {
            username: Some(username.into()),
            password: Some(password.into()),
        };
        auth::login(store, &keys, req).await.is_ok()
    }

    #[tokio::test]
    async fn profile_of_new_user_has_zero_efficiency() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "pw").await;
        let profile = get_profile(&store, id).await.unwrap();
        assert_eq!(profile.user.username, "alice");
        assert_eq!(profile.statistics.total_todos, 0);
        assert_eq!(profile.statistics.efficiency, 0.0);
    }

    #[tokio::test]
    async fn profile_statistics_count_completed_todos() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "pw").await;
        for n in 0..4 {
            let req = CreateTodoRequest {
                title: Some(format!("task {n}")),
                deadline: Some("2030-01-01".into()),
                ..Default::default()
            };
            let todo = todos::create(&store, id, req).await.unwrap();
            if n % 2 == 0 {
                let done = UpdateTodoRequest {
                    is_completed: Patch::Set(true),
                    ..Default::default()
                };
                todos::update(&store, id, &todo.id.to_string(), done).await.unwrap();
            }
        }
        let stats = get_profile(&store, id).await.unwrap().statistics;
        assert_eq!(stats.total_todos, 4);
        assert_eq!(stats.completed_todos, 2);
        assert_eq!(stats.efficiency, 50.0);
    }

    #[tokio::test]
    async fn missing_user_profile_is_not_found() {
        let store = MemoryStore::new();
        let err = get_profile(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "User not found"));
    }

    #[tokio::test]
    async fn update_profile_changes_only_given_fields() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "pw").await;
        let req = UpdateProfileRequest {
            name: Patch::Set("Alice Renamed".into()),
            profile_picture: Patch::Null,
            ..Default::default()
        };
        update_profile(&store, id, req).await.unwrap();

        let user = get_profile(&store, id).await.unwrap().user;
        assert_eq!(user.name, "Alice Renamed");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.phone, "555-0100");
        assert_eq!(user.profile_picture, None);
    }

    #[tokio::test]
    async fn update_profile_email_collision_is_conflict() {
        let store = MemoryStore::new();
        let alice = register(&store, "alice", "alice@example.com", "pw").await;
        register(&store, "bob", "bob@example.com", "pw").await;

        let req = UpdateProfileRequest {
            email: Patch::Set("Bob@Example.com".into()),
            ..Default::default()
        };
        let err = update_profile(&store, alice, req).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(m) if m == "Email already in use"));

        // keeping one's own email is not a collision
        let req = UpdateProfileRequest {
            email: Patch::Set("alice@example.com".into()),
            ..Default::default()
        };
        update_profile(&store, alice, req).await.unwrap();
    }

    #[tokio::test]
    async fn update_profile_rejects_bad_values() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "pw").await;
        for req in [
            UpdateProfileRequest {
                email: Patch::Set("not-an-email".into()),
                ..Default::default()
            },
            UpdateProfileRequest {
                name: Patch::Null,
                ..Default::default()
            },
            UpdateProfileRequest {
                phone: Patch::Set("  ".into()),
                ..Default::default()
            },
        ] {
            let err = update_profile(&store, id, req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn wrong_current_password_leaves_hash_unchanged() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "oldpass").await;
        let before = store.find_user_by_id(id).await.unwrap().unwrap().password_hash;

        let err = change_password(&store, id, change("guess", "newpass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let after = store.find_user_by_id(id).await.unwrap().unwrap().password_hash;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn changed_password_replaces_the_old_one() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "oldpass").await;
        change_password(&store, id, change("oldpass", "newpass"))
            .await
            .unwrap();
        assert!(can_login(&store, "alice", "newpass").await);
        assert!(!can_login(&store, "alice", "oldpass").await);
    }

    #[tokio::test]
    async fn change_password_requires_both_fields() {
        let store = MemoryStore::new();
        let id = register(&store, "alice", "alice@example.com", "oldpass").await;
        let req = ChangePasswordRequest {
            current_password: Some("oldpass".into()),
            new_password: None,
        };
        let err = change_password(&store, id, req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn change_password_for_missing_user_is_not_found() {
        let store = MemoryStore::new();
        let err = change_password(&store, Uuid::new_v4(), change("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
