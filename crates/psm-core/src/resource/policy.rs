// Network security policy operations
//
// `/configs/security/v1/tenant/{tenant}/networksecuritypolicies`

use psm_api::types::{NetworkSecurityPolicy, ResourceSpec, SecurityPolicySpec};
use tracing::debug;

use super::{Reconciler, Scoped, record};
use crate::error::CoreError;
use crate::expand::expand_policy;
use crate::flatten::flatten_policy;
use crate::model::PolicyConfig;
use crate::state::StateStore;
use crate::validate::validate_rule_entries;

impl Scoped for PolicyConfig {
    fn scope(&self) -> (String, String) {
        (self.tenant.clone(), self.name.clone())
    }
}

impl Reconciler {
    /// Validate every rule, `POST` the whole policy, then read it back.
    pub async fn create_policy(
        &self,
        state: &mut (impl StateStore<PolicyConfig> + Send),
    ) -> Result<(), CoreError> {
        let config = state.config();
        validate_rule_entries(&config.rules)?;
        let document = expand_policy(config);
        debug!(
            kind = SecurityPolicySpec::KIND,
            name = %document.meta.name,
            tenant = %document.meta.tenant,
            rules = document.spec.rules.len(),
            "creating"
        );

        let id = self.create_document(&document).await?;
        state.set_id(Some(id));
        self.read_policy(state).await
    }

    pub async fn read_policy(
        &self,
        state: &mut (impl StateStore<PolicyConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = SecurityPolicySpec::KIND, %name, %tenant, "reading");

        let policy: NetworkSecurityPolicy = self.fetch(&tenant, &name).await?;
        if let Some(status) = policy.status.as_ref().and_then(|s| s.propagation_status.as_ref()) {
            debug!(
                %name,
                status = %status.status,
                pending = status.pending,
                "propagation status"
            );
        }
        let config = flatten_policy(&policy, Some(state.config()));
        record(state, policy.meta, config);
        Ok(())
    }

    pub async fn delete_policy(
        &self,
        state: &mut (impl StateStore<PolicyConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = SecurityPolicySpec::KIND, %name, %tenant, "deleting");
        self.delete_document::<SecurityPolicySpec, _>(state, &tenant, &name).await
    }
}
