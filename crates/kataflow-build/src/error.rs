use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Dockerfile template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error(transparent)]
    Playbook(#[from] kataflow_core::PlaybookError),

    #[error("{failed} of {total} jobs failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("{count} image(s) could not be processed")]
    ImagesFailed { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
