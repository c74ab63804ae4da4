//! Core data types shared across the remediation engine and its adapters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Group Policy Object as enumerated from the directory.
///
/// The `id` is the opaque GUID handle used for every follow-up call; the
/// display name only participates in filtering and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gpo {
    pub id: String,
    pub display_name: String,
}

impl Gpo {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Directory principal categories that can hold a GPO delegation.
///
/// `Other` covers snapshot entries held by principals outside the grantable
/// set (well-known groups, aliases). It is never accepted from the command
/// line and never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrusteeType {
    User,
    Group,
    Computer,
    Other,
}

impl fmt::Display for TrusteeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "User",
            Self::Group => "Group",
            Self::Computer => "Computer",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

impl FromStr for TrusteeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "computer" => Ok(Self::Computer),
            _ => Err(format!(
                "unknown trustee type '{s}', expected User, Group or Computer"
            )),
        }
    }
}

/// Delegation tiers grantable on a GPO.
///
/// `Custom` is read-side only: `Get-GPPermission` reports it for entries
/// whose ACL was hand-edited below the standard tiers. It cannot be parsed
/// from the command line and is never passed to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    None,
    GpoRead,
    GpoApply,
    GpoEdit,
    GpoEditDeleteModifySecurity,
    Custom,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::GpoRead => "GpoRead",
            Self::GpoApply => "GpoApply",
            Self::GpoEdit => "GpoEdit",
            Self::GpoEditDeleteModifySecurity => "GpoEditDeleteModifySecurity",
            Self::Custom => "GpoCustom",
        };
        f.write_str(name)
    }
}

impl FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "gporead" => Ok(Self::GpoRead),
            "gpoapply" => Ok(Self::GpoApply),
            "gpoedit" => Ok(Self::GpoEdit),
            "gpoeditdeletemodifysecurity" => Ok(Self::GpoEditDeleteModifySecurity),
            _ => Err(format!(
                "unknown permission level '{s}', expected one of \
                 GpoEditDeleteModifySecurity, None, GpoEdit, GpoApply, GpoRead"
            )),
        }
    }
}

/// One delegation record from a GPO's permission snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub trustee_name: String,
    pub trustee_type: TrusteeType,
    pub level: PermissionLevel,
}

impl PermissionEntry {
    pub fn new(
        trustee_name: impl Into<String>,
        trustee_type: TrusteeType,
        level: PermissionLevel,
    ) -> Self {
        Self {
            trustee_name: trustee_name.into(),
            trustee_type,
            level,
        }
    }

    /// Directory principal names compare case-insensitively.
    pub fn is_for(&self, trustee_name: &str) -> bool {
        self.trustee_name.eq_ignore_ascii_case(trustee_name)
    }
}

/// A trustee plus the delegation level it should end up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrusteeSpec {
    pub name: String,
    pub trustee_type: TrusteeType,
    pub level: PermissionLevel,
}

impl TrusteeSpec {
    /// Spec for the trustee that receives a delegation.
    pub fn grant(name: impl Into<String>, trustee_type: TrusteeType, level: PermissionLevel) -> Self {
        Self {
            name: name.into(),
            trustee_type,
            level,
        }
    }

    /// Spec for the trustee whose delegation is withdrawn; the level is
    /// always `None`.
    pub fn revoke(name: impl Into<String>, trustee_type: TrusteeType) -> Self {
        Self {
            name: name.into(),
            trustee_type,
            level: PermissionLevel::None,
        }
    }
}

/// The full set of named, typed arguments for one remediation run.
#[derive(Debug, Clone)]
pub struct RemediationRequest {
    pub grant: TrusteeSpec,
    pub revoke: TrusteeSpec,
    pub dry_run: bool,
}

impl RemediationRequest {
    pub fn new(grant: TrusteeSpec, revoke: TrusteeSpec, dry_run: bool) -> Self {
        // The revoke side always targets None, whatever the caller built.
        let revoke = TrusteeSpec {
            level: PermissionLevel::None,
            ..revoke
        };
        Self {
            grant,
            revoke,
            dry_run,
        }
    }
}

/// How a GPO's permission snapshot relates to the two trustees of a run.
///
/// Computed once per object before dispatch. `NeitherPresent` is the
/// defensive arm: objects reach classification only after the revoke
/// trustee was seen in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationCase {
    BothPresent,
    OnlyRemovePresent,
    NeitherPresent,
}

impl DelegationCase {
    pub fn classify(entries: &[PermissionEntry], grant: &TrusteeSpec, revoke: &TrusteeSpec) -> Self {
        let grant_present = entries.iter().any(|e| e.is_for(&grant.name));
        let revoke_present = entries.iter().any(|e| e.is_for(&revoke.name));
        match (grant_present, revoke_present) {
            (true, true) => Self::BothPresent,
            (false, true) => Self::OnlyRemovePresent,
            _ => Self::NeitherPresent,
        }
    }
}

/// The filtered target set for one run.
#[derive(Debug, Clone)]
pub struct RemediationPlan {
    pub targets: Vec<Gpo>,
    /// False when no prefix or substring filter was supplied, meaning the
    /// whole domain is on the table.
    pub filtered: bool,
}

/// Accumulated result of one remediation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub dry_run: bool,
    pub examined: usize,
    /// Objects whose snapshot did not contain the revoke trustee.
    pub skipped: usize,
    /// Display names of GPOs where the grant write landed.
    pub granted: Vec<String>,
    /// Display names of GPOs where the revoke write landed.
    pub revoked: Vec<String>,
    /// Write calls issued to the directory (simulated calls included).
    pub mutations_issued: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RemediationOutcome {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            examined: 0,
            skipped: 0,
            granted: Vec::new(),
            revoked: Vec::new(),
            mutations_issued: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }
}
