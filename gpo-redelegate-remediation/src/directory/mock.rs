//! In-memory directory double for engine tests: seeded snapshots, recorded
//! writes, injectable failures.

use crate::directory::{DirectoryError, DirectoryResult, PolicyDirectory};
use crate::types::{Gpo, PermissionEntry, PermissionLevel, TrusteeSpec};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WriteCall {
    pub gpo_id: String,
    pub trustee_name: String,
    pub level: PermissionLevel,
    pub simulate: bool,
}

#[derive(Default)]
pub(crate) struct MockDirectory {
    gpos: Vec<Gpo>,
    permissions: Mutex<HashMap<String, Vec<PermissionEntry>>>,
    calls: Mutex<Vec<WriteCall>>,
    fail_list: bool,
    fail_reads: HashSet<String>,
    fail_writes: HashSet<(String, String)>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gpo(mut self, id: &str, display_name: &str, entries: Vec<PermissionEntry>) -> Self {
        self.gpos.push(Gpo::new(id, display_name));
        self.permissions
            .get_mut()
            .expect("mock lock")
            .insert(id.to_string(), entries);
        self
    }

    pub fn fail_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn fail_read(mut self, gpo_id: &str) -> Self {
        self.fail_reads.insert(gpo_id.to_string());
        self
    }

    pub fn fail_write(mut self, gpo_id: &str, trustee_name: &str) -> Self {
        self.fail_writes
            .insert((gpo_id.to_string(), trustee_name.to_string()));
        self
    }

    /// Current (possibly mutated) snapshot for one GPO.
    pub fn permissions(&self, gpo_id: &str) -> Vec<PermissionEntry> {
        self.permissions
            .lock()
            .expect("mock lock")
            .get(gpo_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every write call seen, in issue order.
    pub fn calls(&self) -> Vec<WriteCall> {
        self.calls.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl PolicyDirectory for MockDirectory {
    async fn list_policy_objects(&self) -> DirectoryResult<Vec<Gpo>> {
        if self.fail_list {
            return Err(DirectoryError::Service("directory unreachable".to_string()));
        }
        Ok(self.gpos.clone())
    }

    async fn read_permissions(&self, gpo_id: &str) -> DirectoryResult<Vec<PermissionEntry>> {
        if self.fail_reads.contains(gpo_id) {
            return Err(DirectoryError::Read(format!(
                "cannot read permissions on {gpo_id}"
            )));
        }
        Ok(self.permissions(gpo_id))
    }

    async fn write_permission(
        &self,
        gpo_id: &str,
        trustee: &TrusteeSpec,
        simulate: bool,
    ) -> DirectoryResult<()> {
        self.calls.lock().expect("mock lock").push(WriteCall {
            gpo_id: gpo_id.to_string(),
            trustee_name: trustee.name.clone(),
            level: trustee.level,
            simulate,
        });

        if self
            .fail_writes
            .contains(&(gpo_id.to_string(), trustee.name.clone()))
        {
            return Err(DirectoryError::Write(format!(
                "cannot set {} on {gpo_id}",
                trustee.name
            )));
        }

        if !simulate {
            let mut permissions = self.permissions.lock().expect("mock lock");
            let entries = permissions.entry(gpo_id.to_string()).or_default();
            entries.retain(|e| !e.is_for(&trustee.name));
            if trustee.level != PermissionLevel::None {
                entries.push(PermissionEntry::new(
                    trustee.name.clone(),
                    trustee.trustee_type,
                    trustee.level,
                ));
            }
        }
        Ok(())
    }
}
