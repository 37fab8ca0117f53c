use axum::{extract::State, middleware::from_fn_with_state, routing::{get, put}, Json, Router};
use tracing::instrument;

use crate::{
    app::route_not_found,
    auth::{middleware::require_auth, AuthUser},
    dto::Ack,
    error::AppResult,
    extract::ApiJson,
    state::AppState,
    users::{
        dto::{ChangePasswordRequest, ProfileResponse, UpdateProfileRequest},
        services,
    },
};

pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile).put(update_profile))
        .route("/users/change-password", put(change_password))
        .method_not_allowed_fallback(route_not_found)
        .route_layer(from_fn_with_state(state, require_auth))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let profile = services::get_profile(state.store.as_ref(), user_id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<Ack>> {
    services::update_profile(state.store.as_ref(), user_id, payload).await?;
    Ok(Json(Ack::new("Profile updated successfully")))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> AppResult<Json<Ack>> {
    services::change_password(state.store.as_ref(), user_id, payload).await?;
    Ok(Json(Ack::new("Password changed successfully")))
}
