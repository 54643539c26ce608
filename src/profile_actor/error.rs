use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during profile operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Profile validation error: {0}")]
    ValidationError(String),
    #[error("Profile storage error: {0}")]
    StorageError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ProfileError {
    fn from(error: FrameworkError) -> Self {
        match error {
            FrameworkError::NotFound(id) => ProfileError::NotFound(id),
            FrameworkError::Rejected(msg) => ProfileError::ValidationError(msg),
            FrameworkError::AlreadyExists(id) => {
                ProfileError::ValidationError(format!("profile already exists: {id}"))
            }
            FrameworkError::Snapshot(msg) => ProfileError::StorageError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                ProfileError::ActorCommunicationError(error.to_string())
            }
        }
    }
}
