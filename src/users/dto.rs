use serde::{Deserialize, Serialize};

use crate::patch::Patch;
use crate::todos::repo_types::TodoCounts;
use crate::users::repo_types::User;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub statistics: Statistics,
}

/// Derived on every request from the user's todos; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_todos: i64,
    pub completed_todos: i64,
    /// Completed share in percent; 0 when there are no todos.
    pub efficiency: f64,
}

impl From<TodoCounts> for Statistics {
    fn from(c: TodoCounts) -> Self {
        let efficiency = if c.total > 0 {
            c.completed as f64 / c.total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_todos: c.total,
            completed_todos: c.completed,
            efficiency,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub profile_picture: Patch<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "current_password")]
    pub current_password: Option<String>,
    #[serde(alias = "new_password")]
    pub new_password: Option<String>,
}
