// ── NAT policy desired state ──

use serde::{Deserialize, Serialize};

use super::common::{AddressBlock, default_scope, default_target_list};
use crate::convert::singleton;

/// Rule type for which a missing translated destination is inferred.
pub const STATIC_NAT: &str = "static";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatPolicyConfig {
    pub name: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default = "default_target_list")]
    pub policy_distribution_targets: Vec<String>,
    #[serde(default)]
    pub rules: Vec<NatRuleConfig>,
}

/// One NAT rule.
///
/// Optional blocks are `Some` when declared, even if declared empty. The
/// validator relies on that to tell "declared" from "absent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatRuleConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub rule_type: String,
    #[serde(default)]
    pub disable: bool,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub source: Option<AddressBlock>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub destination: Option<AddressBlock>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub destination_proto_port: Option<ProtoPortConfig>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub translated_source: Option<AddressBlock>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub translated_destination: Option<AddressBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_destination_port: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtoPortConfig {
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}
