// ── Security policy and rule desired state ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::common::{AddressBlock, default_scope, default_target_set, default_true};
use crate::convert::singleton;

/// What a matching rule does with traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum RuleAction {
    Permit,
    Deny,
    Reject,
}

/// A whole network security policy managed as one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub name: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default = "default_true")]
    pub attach_tenant: bool,
    #[serde(default = "default_target_set")]
    pub policy_distribution_targets: BTreeSet<String>,
    #[serde(default)]
    pub rules: Vec<RuleEntryConfig>,
}

impl PolicyConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tenant: default_scope(),
            namespace: default_scope(),
            attach_tenant: true,
            policy_distribution_targets: default_target_set(),
            rules: Vec::new(),
        }
    }
}

/// One rule as it appears inside a policy.
///
/// `action` stays a string so an unknown value reaches the validator and is
/// reported with the rule's index instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntryConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub action: String,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub from: Option<AddressBlock>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub to: Option<AddressBlock>,
    #[serde(default)]
    pub apps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
}

/// A single rule managed on its own inside an existing policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the policy document that holds the rule.
    pub policy: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default = "default_scope")]
    pub policy_distribution_target: String,
    pub rule: RuleEntryConfig,
}
