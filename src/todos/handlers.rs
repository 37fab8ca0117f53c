use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    app::route_not_found,
    auth::{middleware::require_auth, AuthUser},
    dto::Ack,
    error::AppResult,
    extract::ApiJson,
    state::AppState,
    todos::{
        dto::{CreateTodoRequest, CreatedTodoResponse, UpdateTodoRequest},
        repo_types::Todo,
        services,
    },
};

pub fn todo_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        // set before the auth layer so a wrong method still needs a token
        .method_not_allowed_fallback(route_not_found)
        .route_layer(from_fn_with_state(state, require_auth))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Todo>>> {
    let todos = services::list_all(state.store.as_ref(), user_id).await?;
    Ok(Json(todos))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Todo>> {
    let todo = services::get_by_id(state.store.as_ref(), user_id, &id).await?;
    Ok(Json(todo))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateTodoRequest>,
) -> AppResult<(StatusCode, Json<CreatedTodoResponse>)> {
    let todo = services::create(state.store.as_ref(), user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedTodoResponse {
            message: "Todo created successfully",
            todo,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTodoRequest>,
) -> AppResult<Json<Ack>> {
    services::update(state.store.as_ref(), user_id, &id, payload).await?;
    Ok(Json(Ack::new("Todo updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Ack>> {
    services::delete(state.store.as_ref(), user_id, &id).await?;
    Ok(Json(Ack::new("Todo deleted successfully")))
}
