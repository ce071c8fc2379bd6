use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid goal provided: '{0}'")]
    InvalidGoal(String),

    #[error("meal pool for {pool} has {available} entries, need at least {required}")]
    InvalidPool {
        pool: String,
        available: usize,
        required: usize,
    },
}

impl PlanError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
