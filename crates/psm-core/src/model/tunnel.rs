// ── IPsec tunnel desired state ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::common::{default_scope, default_target_list, default_true};
use crate::convert::singleton;

/// How an IKE security association authenticates its peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AuthType {
    Psk,
    Certificates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelConfig {
    pub name: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub tunnel: Option<TunnelBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelBlock {
    #[serde(default)]
    pub ha_mode: String,
    #[serde(default)]
    pub tunnel_endpoints: Vec<EndpointConfig>,
    #[serde(default = "default_target_list")]
    pub policy_distribution_targets: Vec<String>,
    #[serde(default)]
    pub disable_tcp_mss_adjust: bool,
    /// Tunnel-wide lifetimes.
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<LifetimeConfig>,
}

impl Default for TunnelBlock {
    fn default() -> Self {
        Self {
            ha_mode: String::new(),
            tunnel_endpoints: Vec::new(),
            policy_distribution_targets: default_target_list(),
            disable_tcp_mss_adjust: false,
            lifetime: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub interface_name: String,
    #[serde(default)]
    pub dse: String,
    #[serde(default)]
    pub ike_version: String,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub ike_sa: Option<IkeSaConfig>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub ipsec_sa: Option<IpsecSaConfig>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub local_identifier: Option<IdentifierConfig>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub remote_identifier: Option<IdentifierConfig>,
    #[serde(default, with = "singleton", skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<LifetimeConfig>,
}

/// Phase 1 parameters.
///
/// `pre_shared_key` is write-only upstream: the server never returns it, so
/// flattening carries the stored value forward. The certificate fields are
/// only sent when `auth_type` is `certificates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IkeSaConfig {
    #[serde(default)]
    pub encryption_algorithms: Vec<String>,
    #[serde(default)]
    pub hash_algorithms: Vec<String>,
    #[serde(default)]
    pub dh_groups: Vec<String>,
    #[serde(default)]
    pub rekey_lifetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_shared_key: Option<String>,
    #[serde(default)]
    pub reauth_lifetime: String,
    #[serde(default)]
    pub dpd_delay: String,
    #[serde(default)]
    pub ikev1_dpd_timeout: String,
    #[serde(default = "default_true")]
    pub ike_initiator: bool,
    #[serde(default)]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_identity_certificates: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_ca_certificates: Vec<String>,
}

impl Default for IkeSaConfig {
    fn default() -> Self {
        Self {
            encryption_algorithms: Vec::new(),
            hash_algorithms: Vec::new(),
            dh_groups: Vec::new(),
            rekey_lifetime: String::new(),
            pre_shared_key: None,
            reauth_lifetime: String::new(),
            dpd_delay: String::new(),
            ikev1_dpd_timeout: String::new(),
            ike_initiator: true,
            auth_type: String::new(),
            local_identity_certificates: None,
            remote_ca_certificates: Vec::new(),
        }
    }
}

/// Phase 2 parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpsecSaConfig {
    pub encryption_algorithms: Vec<String>,
    pub dh_groups: Vec<String>,
    pub rekey_lifetime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    #[serde(rename = "type")]
    pub id_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sa_lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ike_lifetime: Option<String>,
}
