use serde::Serialize;

/// Body of a successful write that returns no resource.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: String,
    pub success: bool,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}
