use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{AppError, AppResult},
    store::{Store, StoreError, UniqueField},
    users::repo_types::{NewUser, User},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Lower-cases and shape-checks an email address.
pub(crate) fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(email)
}

/// Trimmed value, or `None` when missing or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Maps a storage uniqueness violation on registration to a `Conflict`.
fn registration_conflict(e: StoreError) -> AppError {
    match e {
        StoreError::UniqueViolation(UniqueField::Username) => {
            AppError::Conflict("Username already exists".into())
        }
        StoreError::UniqueViolation(UniqueField::Email) => {
            AppError::Conflict("Email already exists".into())
        }
        other => other.into(),
    }
}

/// Creates a user. Uniqueness of username and email is decided by the store's
/// constraints, so two racing registrations cannot both succeed.
pub async fn register(store: &dyn Store, req: RegisterRequest) -> AppResult<User> {
    let name = non_blank(req.name);
    let email = non_blank(req.email);
    let phone = non_blank(req.phone);
    let username = non_blank(req.username);
    let password = req.password.filter(|p| !p.is_empty());

    let (Some(name), Some(email), Some(phone), Some(username), Some(password)) =
        (name, email, phone, username, password)
    else {
        warn!("registration with missing fields");
        return Err(AppError::validation(
            "Name, email, phone, username and password are required",
        ));
    };
    let email = normalize_email(&email)?;

    let password_hash = hash_password(&password)?;
    let new = NewUser {
        id: Uuid::new_v4(),
        name,
        email,
        phone,
        username,
        password_hash,
        profile_picture: non_blank(req.profile_picture),
    };

    let user = store.insert_user(new).await.map_err(|e| {
        let err = registration_conflict(e);
        if let AppError::Conflict(reason) = &err {
            warn!(%reason, "registration conflict");
        }
        err
    })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Checks credentials and issues an access token.
pub async fn login(store: &dyn Store, keys: &JwtKeys, req: LoginRequest) -> AppResult<LoginResponse> {
    let (Some(username), Some(password)) = (non_blank(req.username), req.password) else {
        return Err(AppError::InvalidCredentials);
    };

    let Some(user) = store.find_user_by_username(&username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = keys.issue(user.id).map_err(anyhow::Error::new)?;
    info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        access_token,
        user: user.into(),
    })
}
