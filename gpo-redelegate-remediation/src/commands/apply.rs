//! Classification and mutation logic for the remediation service

use crate::directory::PolicyDirectory;
use crate::types::{
    DelegationCase, Gpo, PermissionEntry, RemediationOutcome, RemediationPlan, RemediationRequest,
    TrusteeSpec,
};
use log::{debug, info, warn};

impl<D: PolicyDirectory> super::service::RemediationService<D> {
    /// Run the classify-and-mutate pass over every target in the plan.
    ///
    /// Each object is handled independently: a failed read or write is
    /// recorded in the outcome and the loop moves to the next object. Only
    /// objects whose snapshot contains the revoke trustee are ever touched.
    pub async fn apply(
        &self,
        plan: &RemediationPlan,
        request: &RemediationRequest,
    ) -> RemediationOutcome {
        let mut outcome = RemediationOutcome::new(request.dry_run);

        for gpo in &plan.targets {
            outcome.examined += 1;

            let entries = match self.directory.read_permissions(&gpo.id).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("{}: permission read failed: {e}", gpo.display_name);
                    outcome.add_error(format!("{}: permission read failed: {e}", gpo.display_name));
                    // Never evaluate the membership check against absent data.
                    continue;
                }
            };

            if !holds_delegation(&entries, &request.revoke.name) {
                debug!(
                    "{}: {} holds no delegation, skipping",
                    gpo.display_name, request.revoke.name
                );
                outcome.skipped += 1;
                continue;
            }

            match DelegationCase::classify(&entries, &request.grant, &request.revoke) {
                DelegationCase::BothPresent => {
                    info!(
                        "{}: {} already delegated, withdrawing {}",
                        gpo.display_name, request.grant.name, request.revoke.name
                    );
                    if self.write(gpo, &request.revoke, request, &mut outcome).await {
                        outcome.revoked.push(gpo.display_name.clone());
                    }
                }
                DelegationCase::OnlyRemovePresent => {
                    info!(
                        "{}: delegating {} at {}, then withdrawing {}",
                        gpo.display_name,
                        request.grant.name,
                        request.grant.level,
                        request.revoke.name
                    );
                    // Grant before revoking: the object must never sit with
                    // neither trustee delegated if the run dies between the
                    // two writes. A failed grant therefore also skips the
                    // revoke for this object.
                    if !self.write(gpo, &request.grant, request, &mut outcome).await {
                        continue;
                    }
                    outcome.granted.push(gpo.display_name.clone());
                    if self.write(gpo, &request.revoke, request, &mut outcome).await {
                        outcome.revoked.push(gpo.display_name.clone());
                    }
                }
                DelegationCase::NeitherPresent => {
                    warn!(
                        "{}: snapshot lost {} between membership check and classification",
                        gpo.display_name, request.revoke.name
                    );
                    outcome.add_warning(format!(
                        "{}: inconsistent permission snapshot, left untouched",
                        gpo.display_name
                    ));
                }
            }
        }

        outcome
    }

    async fn write(
        &self,
        gpo: &Gpo,
        trustee: &TrusteeSpec,
        request: &RemediationRequest,
        outcome: &mut RemediationOutcome,
    ) -> bool {
        match self
            .directory
            .write_permission(&gpo.id, trustee, request.dry_run)
            .await
        {
            Ok(()) => {
                outcome.mutations_issued += 1;
                true
            }
            Err(e) => {
                warn!(
                    "{}: failed to set {} to {}: {e}",
                    gpo.display_name, trustee.name, trustee.level
                );
                outcome.add_error(format!(
                    "{}: failed to set {} to {}: {e}",
                    gpo.display_name, trustee.name, trustee.level
                ));
                false
            }
        }
    }
}

fn holds_delegation(entries: &[PermissionEntry], trustee_name: &str) -> bool {
    entries.iter().any(|e| e.is_for(trustee_name))
}
