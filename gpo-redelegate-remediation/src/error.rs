//! Error types for the remediation library.

use crate::directory::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemediationError {
    /// Enumerating the policy objects failed. Fatal: without the object
    /// list there is nothing to evaluate.
    #[error("failed to enumerate policy objects: {0}")]
    Enumeration(DirectoryError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

pub type RemediationResult<T> = Result<T, RemediationError>;
