// Embedded security rule operations
//
// A rule has no URL of its own. Every operation reads the enclosing policy,
// edits its rule list, and writes the whole policy back with `PUT`. The
// stored id is the policy's uuid.

use psm_api::types::{NetworkSecurityPolicy, RuleDetail, SecurityPolicySpec};
use tracing::{debug, warn};

use super::{Reconciler, forget, record, uuid_of};
use crate::error::CoreError;
use crate::expand::expand_rule_entry;
use crate::flatten::flatten_rule;
use crate::model::RuleConfig;
use crate::state::StateStore;
use crate::validate::validate_rule_entries;

impl Reconciler {
    /// Insert the rule into its policy, replacing any rule with the same
    /// name, then read it back. Running it twice leaves one copy.
    pub async fn create_rule(
        &self,
        state: &mut (impl StateStore<RuleConfig> + Send),
    ) -> Result<(), CoreError> {
        let config = state.config();
        validate_rule_entries(std::slice::from_ref(&config.rule))?;
        let detail = expand_rule_entry(&config.rule);
        let (tenant, policy_name) = (config.tenant.clone(), config.policy.clone());
        debug!(kind = "Rule", name = %detail.name, policy = %policy_name, %tenant, "creating");

        let mut policy: NetworkSecurityPolicy = self.fetch(&tenant, &policy_name).await?;
        upsert_rule(&mut policy.spec.rules, detail);
        let updated: NetworkSecurityPolicy = self.client.replace_object(&policy).await?;

        state.set_id(Some(uuid_of::<SecurityPolicySpec>(&updated.meta)?));
        self.read_rule(state).await
    }

    /// Refresh the rule from its policy. A rule that has disappeared from
    /// the policy clears the stored id instead of failing.
    pub async fn read_rule(
        &self,
        state: &mut (impl StateStore<RuleConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, policy_name) = (state.config().tenant.clone(), state.config().policy.clone());
        let rule_name = state.config().rule.name.clone();
        debug!(kind = "Rule", name = %rule_name, policy = %policy_name, %tenant, "reading");

        let policy: NetworkSecurityPolicy = self.fetch(&tenant, &policy_name).await?;
        match flatten_rule(&policy, state.config()) {
            Some(config) => record(state, policy.meta, config),
            None => {
                warn!(rule = %rule_name, policy = %policy_name, "rule not found in policy");
                forget(state);
            }
        }
        Ok(())
    }

    /// Remove the rule from its policy and write the policy back. A rule
    /// that is already gone costs no write.
    pub async fn delete_rule(
        &self,
        state: &mut (impl StateStore<RuleConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, policy_name) = (state.config().tenant.clone(), state.config().policy.clone());
        let rule_name = state.config().rule.name.clone();
        debug!(kind = "Rule", name = %rule_name, policy = %policy_name, %tenant, "deleting");

        let mut policy: NetworkSecurityPolicy = self.fetch(&tenant, &policy_name).await?;
        let before = policy.spec.rules.len();
        policy.spec.rules.retain(|rule| rule.name != rule_name);

        if policy.spec.rules.len() == before {
            debug!(rule = %rule_name, "rule already absent");
        } else {
            let _: NetworkSecurityPolicy = self.client.replace_object(&policy).await?;
        }
        forget(state);
        Ok(())
    }
}

fn upsert_rule(rules: &mut Vec<RuleDetail>, detail: RuleDetail) {
    match rules.iter_mut().find(|rule| rule.name == detail.name) {
        Some(existing) => *existing = detail,
        None => rules.push(detail),
    }
}
