//! Remediation Service Layer
//!
//! The service holds the directory collaborator and exposes the two
//! high-level operations of a run: `plan` (enumerate and filter the target
//! set) and `apply` (classify and mutate each target). Front ends own the
//! confirmation step between the two.

use crate::directory::powershell::PowerShellDirectory;
use crate::directory::PolicyDirectory;

pub struct RemediationService<D: PolicyDirectory> {
    pub(crate) directory: D,
}

impl<D: PolicyDirectory> RemediationService<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    // plan() method implementation is in plan.rs
    // apply() method implementation is in apply.rs
}

impl RemediationService<PowerShellDirectory> {
    /// Service wired to the GroupPolicy tooling on this host.
    pub fn connect() -> Self {
        Self::new(PowerShellDirectory::new())
    }
}
