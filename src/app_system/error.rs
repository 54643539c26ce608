use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Could not restore {store}: {source}")]
    Restore {
        store: &'static str,
        source: FrameworkError,
    },
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}
