use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections render as our `{error, success}` body with 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
