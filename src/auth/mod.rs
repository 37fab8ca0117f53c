use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod services;

pub use middleware::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
