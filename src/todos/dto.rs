use serde::{Deserialize, Serialize};

use crate::patch::Patch;
use crate::todos::repo_types::Todo;

#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub deadline: Option<String>, // RFC 3339 or YYYY-MM-DD
}

/// Partial update: keys left out of the JSON body are not touched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub is_completed: Patch<bool>,
    #[serde(default)]
    pub priority: Patch<i32>,
    #[serde(default)]
    pub deadline: Patch<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTodoResponse {
    pub message: &'static str,
    pub todo: Todo,
}
