//! The external directory collaborator: trait, errors, and the shipped
//! PowerShell GroupPolicy adapter.

pub(crate) mod powershell;

#[cfg(test)]
pub(crate) mod mock;

use crate::types::{Gpo, PermissionEntry, TrusteeSpec};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("directory service error: {0}")]
    Service(String),
    #[error("permission read error: {0}")]
    Read(String),
    #[error("permission write error: {0}")]
    Write(String),
    #[error("malformed response from directory tooling: {0}")]
    Malformed(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// The three primitives the remediation engine consumes.
///
/// Implementations are expected to be stateless between calls; every
/// operation stands alone and carries the GPO handle it applies to.
#[async_trait]
pub trait PolicyDirectory: Send + Sync {
    /// Enumerate every GPO in the domain.
    async fn list_policy_objects(&self) -> DirectoryResult<Vec<Gpo>>;

    /// Snapshot the delegation entries of one GPO.
    async fn read_permissions(&self, gpo_id: &str) -> DirectoryResult<Vec<PermissionEntry>>;

    /// Set one trustee's delegation on one GPO, replacing any existing
    /// entry. A level of `None` withdraws the delegation. With `simulate`
    /// the directory reports what it would do without applying it.
    async fn write_permission(
        &self,
        gpo_id: &str,
        trustee: &TrusteeSpec,
        simulate: bool,
    ) -> DirectoryResult<()>;
}
