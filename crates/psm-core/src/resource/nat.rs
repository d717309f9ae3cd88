// NAT policy operations
//
// `/configs/network/v1/tenant/{tenant}/natpolicies`

use psm_api::types::{NatPolicy, NatPolicySpec, ResourceSpec};
use tracing::debug;

use super::{Reconciler, Scoped, record};
use crate::error::CoreError;
use crate::expand::expand_nat_policy;
use crate::flatten::flatten_nat_policy;
use crate::model::NatPolicyConfig;
use crate::state::StateStore;
use crate::validate::validate_nat_rules;

impl Scoped for NatPolicyConfig {
    fn scope(&self) -> (String, String) {
        (self.tenant.clone(), self.name.clone())
    }
}

impl Reconciler {
    /// Validate every rule, `POST` the policy, then read it back.
    ///
    /// Static rules without a translated destination get one inferred from
    /// their destination during expansion.
    pub async fn create_nat_policy(
        &self,
        state: &mut (impl StateStore<NatPolicyConfig> + Send),
    ) -> Result<(), CoreError> {
        let config = state.config();
        validate_nat_rules(&config.rules)?;
        let document = expand_nat_policy(config);
        debug!(
            kind = NatPolicySpec::KIND,
            name = %document.meta.name,
            tenant = %document.meta.tenant,
            rules = document.spec.rules.len(),
            "creating"
        );

        let id = self.create_document(&document).await?;
        state.set_id(Some(id));
        self.read_nat_policy(state).await
    }

    pub async fn read_nat_policy(
        &self,
        state: &mut (impl StateStore<NatPolicyConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = NatPolicySpec::KIND, %name, %tenant, "reading");

        let policy: NatPolicy = self.fetch(&tenant, &name).await?;
        let config = flatten_nat_policy(&policy, Some(state.config()));
        record(state, policy.meta, config);
        Ok(())
    }

    pub async fn delete_nat_policy(
        &self,
        state: &mut (impl StateStore<NatPolicyConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = NatPolicySpec::KIND, %name, %tenant, "deleting");
        self.delete_document::<NatPolicySpec, _>(state, &tenant, &name).await
    }
}
