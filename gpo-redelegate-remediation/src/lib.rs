//! This crate provides the core logic for gpo-redelegate:
//! - GPO display-name filtering
//! - Delegation classification (which trustees a snapshot contains)
//! - Guarded, partial-failure-tolerant permission writes
//! - The directory collaborator trait and its GroupPolicy tooling adapter
//!

mod commands;
mod directory;
mod error;
mod filter;
mod types;

// Re-exports for a small, focused public API
pub use commands::RemediationService;
pub use directory::{DirectoryError, DirectoryResult, PolicyDirectory};
pub use directory::powershell::PowerShellDirectory;
pub use error::{RemediationError, RemediationResult};
pub use filter::GpoFilter;
pub use types::{
    DelegationCase, Gpo, PermissionEntry, PermissionLevel, RemediationOutcome, RemediationPlan,
    RemediationRequest, TrusteeSpec, TrusteeType,
};
