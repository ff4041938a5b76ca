use thiserror::Error;

use crate::core::section::Section;

#[derive(Debug, Error)]
pub enum DaybookError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no task {task} in {section} on {date}")]
    NotFound {
        date: String,
        section: Section,
        task: String,
    },

    #[error("default task \"{0}\" cannot be deleted")]
    Permission(String),

    #[error("failed to persist planner data: {0}")]
    Persistence(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DaybookError {
    /// Errors the caller recovers from by showing a notice; state is untouched.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Permission(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DaybookError>;
