//! `PolicyDirectory` adapter backed by the Windows GroupPolicy module.
//!
//! Each primitive shells out to `powershell -NoProfile -ExecutionPolicy
//! Bypass -Command` and exchanges compact JSON, the same transport the
//! GroupPolicy cmdlets are normally scripted with. The adapter holds no
//! session: every call imports the module and stands alone.

use crate::directory::{DirectoryError, DirectoryResult, PolicyDirectory};
use crate::types::{Gpo, PermissionEntry, PermissionLevel, TrusteeSpec, TrusteeType};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::process::Command;

const LIST_SCRIPT: &str = "\
Import-Module GroupPolicy -ErrorAction Stop
$gpos = @(Get-GPO -All -ErrorAction Stop | ForEach-Object { @{ Id = $_.Id.ToString(); DisplayName = $_.DisplayName } })
ConvertTo-Json -InputObject $gpos -Compress";

pub struct PowerShellDirectory {
    executable: String,
}

impl PowerShellDirectory {
    pub fn new() -> Self {
        Self {
            executable: "powershell".to_string(),
        }
    }

    /// Point the adapter at a different host binary, e.g. `pwsh`.
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    async fn run(&self, script: &str) -> Result<String, String> {
        let output = Command::new(&self.executable)
            .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", script])
            .output()
            .await
            .map_err(|e| format!("failed to launch {}: {e}", self.executable))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.executable,
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PowerShellDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyDirectory for PowerShellDirectory {
    async fn list_policy_objects(&self) -> DirectoryResult<Vec<Gpo>> {
        let stdout = self
            .run(LIST_SCRIPT)
            .await
            .map_err(DirectoryError::Service)?;
        let raw: Vec<RawGpo> = parse_list(&stdout)?;
        debug!("enumerated {} policy objects", raw.len());
        Ok(raw
            .into_iter()
            .map(|g| Gpo::new(g.id, g.display_name))
            .collect())
    }

    async fn read_permissions(&self, gpo_id: &str) -> DirectoryResult<Vec<PermissionEntry>> {
        let script = format!(
            "Import-Module GroupPolicy -ErrorAction Stop\n\
             $perms = @(Get-GPPermission -Guid '{guid}' -All -ErrorAction Stop | \
             ForEach-Object {{ @{{ Trustee = $_.Trustee.Name; SidType = $_.Trustee.SidType.ToString(); Permission = $_.Permission.ToString() }} }})\n\
             ConvertTo-Json -InputObject $perms -Compress",
            guid = quote(gpo_id)
        );
        let stdout = self.run(&script).await.map_err(DirectoryError::Read)?;
        let raw: Vec<RawPermission> = parse_list(&stdout)?;

        let mut entries = Vec::with_capacity(raw.len());
        for perm in raw {
            // Orphaned SIDs come back without a resolvable name; they can
            // never match a trustee argument, so they are dropped here.
            let Some(trustee) = perm.trustee else {
                debug!("skipping unresolvable trustee on {gpo_id}");
                continue;
            };
            entries.push(PermissionEntry::new(
                trustee,
                trustee_type_from_wire(&perm.sid_type),
                level_from_wire(&perm.permission),
            ));
        }
        Ok(entries)
    }

    async fn write_permission(
        &self,
        gpo_id: &str,
        trustee: &TrusteeSpec,
        simulate: bool,
    ) -> DirectoryResult<()> {
        let what_if = if simulate { " -WhatIf" } else { "" };
        let script = format!(
            "Import-Module GroupPolicy -ErrorAction Stop\n\
             Set-GPPermission -Guid '{guid}' -TargetName '{name}' -TargetType {ty} \
             -PermissionLevel {level} -Replace{what_if} -ErrorAction Stop | Out-Null",
            guid = quote(gpo_id),
            name = quote(&trustee.name),
            ty = trustee.trustee_type,
            level = trustee.level,
        );
        debug!(
            "setting {} to {} on {gpo_id}{}",
            trustee.name,
            trustee.level,
            if simulate { " (simulated)" } else { "" }
        );
        self.run(&script).await.map_err(DirectoryError::Write)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawGpo {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "DisplayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RawPermission {
    #[serde(rename = "Trustee")]
    trustee: Option<String>,
    #[serde(rename = "SidType")]
    sid_type: String,
    #[serde(rename = "Permission")]
    permission: String,
}

/// Parse a JSON pipeline result. `ConvertTo-Json` unwraps single-element
/// pipelines to a bare object, so both shapes are accepted.
fn parse_list<T: DeserializeOwned>(raw: &str) -> DirectoryResult<Vec<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if let Ok(list) = serde_json::from_str::<Vec<T>>(raw) {
        return Ok(list);
    }
    serde_json::from_str::<T>(raw)
        .map(|item| vec![item])
        .map_err(|e| DirectoryError::Malformed(format!("{e}: {raw}")))
}

/// Double single quotes for embedding in a single-quoted PowerShell string.
fn quote(value: &str) -> String {
    value.replace('\'', "''")
}

fn trustee_type_from_wire(sid_type: &str) -> TrusteeType {
    match sid_type {
        "User" => TrusteeType::User,
        "Group" => TrusteeType::Group,
        "Computer" => TrusteeType::Computer,
        _ => TrusteeType::Other,
    }
}

fn level_from_wire(permission: &str) -> PermissionLevel {
    // Anything outside the standard tiers is a hand-edited ACL.
    permission
        .parse::<PermissionLevel>()
        .unwrap_or(PermissionLevel::Custom)
}
