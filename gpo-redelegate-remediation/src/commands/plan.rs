//! Plan creation logic for the remediation service

use crate::directory::PolicyDirectory;
use crate::error::{RemediationError, RemediationResult};
use crate::filter::GpoFilter;
use crate::types::RemediationPlan;
use log::debug;

impl<D: PolicyDirectory> super::service::RemediationService<D> {
    /// Enumerate the domain's GPOs and retain those matching the filter.
    ///
    /// Enumeration failure is fatal to the run; there is nothing to
    /// evaluate without the object list.
    pub async fn plan(&self, filter: &GpoFilter) -> RemediationResult<RemediationPlan> {
        let all = self
            .directory
            .list_policy_objects()
            .await
            .map_err(RemediationError::Enumeration)?;

        let total = all.len();
        let targets = filter.apply(all);
        debug!(
            "retained {} of {} policy objects after filtering",
            targets.len(),
            total
        );

        Ok(RemediationPlan {
            targets,
            filtered: !filter.is_unrestricted(),
        })
    }
}
