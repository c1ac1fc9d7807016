use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaybookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid event {}: {reason}", .id.as_deref().unwrap_or("<missing id>"))]
    InvalidEvent { id: Option<String>, reason: String },
    #[error("Duplicate event id: {0}")]
    DuplicateEventId(String),
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

impl DaybookError {
    pub(crate) fn invalid_event(id: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            id: id.map(ToOwned::to_owned),
            reason: reason.into(),
        }
    }
}
