//! Wire types for the policy manager's config API.
//!
//! Every document has the `{ kind, api-version, meta, spec, status }` shape.
//! Field names are kebab-case on the wire. `status` is server-owned: it is
//! decoded for inspection but never serialized back.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Collection;
use crate::de::{loose_bool, null_as_default};

/// The `api-version` every document is written with.
pub const API_VERSION: &str = "v1";

// ── Envelope ─────────────────────────────────────────────────────────

/// A spec type that is stored as its own document in a collection.
pub trait ResourceSpec: Serialize + DeserializeOwned + Send + Sync {
    /// Value of the document's `kind` field.
    const KIND: &'static str;
    /// Collection the document lives in.
    const COLLECTION: Collection;
}

/// Object metadata. `name`, `tenant` and `namespace` are client-supplied;
/// the rest is assigned by the server and carried back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ObjectMeta {
    pub name: String,
    pub tenant: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Untyped on the server side; round-tripped as received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Value>,
    /// Server timestamps stay opaque so a PUT echoes them byte for byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_time: Option<String>,
}

impl ObjectMeta {
    /// Metadata for a document the client is about to create.
    pub fn new(name: impl Into<String>, tenant: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tenant: tenant.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}

/// A complete config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Object<S, T = Value> {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub meta: ObjectMeta,
    pub spec: S,
    #[serde(skip_serializing)]
    pub status: Option<T>,
}

impl<S: ResourceSpec, T> Object<S, T> {
    /// Wrap a spec in a fresh document of the spec's kind.
    pub fn new(meta: ObjectMeta, spec: S) -> Self {
        Self {
            kind: S::KIND.to_owned(),
            api_version: API_VERSION.to_owned(),
            meta,
            spec,
            status: None,
        }
    }
}

// ── Network security policy ──────────────────────────────────────────

pub type NetworkSecurityPolicy = Object<SecurityPolicySpec, PolicyStatus>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SecurityPolicySpec {
    pub attach_tenant: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub rules: Vec<RuleDetail>,
    /// Opaque ordering hint; round-tripped untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub policy_distribution_targets: Vec<String>,
}

impl ResourceSpec for SecurityPolicySpec {
    const KIND: &'static str = "NetworkSecurityPolicy";
    const COLLECTION: Collection = Collection::NetworkSecurityPolicies;
}

/// One rule inside a security policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RuleDetail {
    pub name: String,
    pub description: String,
    pub action: String,
    #[serde(deserialize_with = "null_as_default")]
    pub apps: Vec<String>,
    #[serde(
        rename = "from-ipcollections",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub from_ip_collections: Vec<String>,
    #[serde(
        rename = "to-ipcollections",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub to_ip_collections: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub from_ip_addresses: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub to_ip_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "loose_bool")]
    pub disable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyStatus {
    pub propagation_status: Option<PropagationStatus>,
}

/// How far the policy has been pushed to its distribution targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PropagationStatus {
    pub generation_id: String,
    pub updated: i64,
    pub pending: i64,
    pub min_version: String,
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pdt_status: Vec<TargetStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TargetStatus {
    pub name: String,
    pub updated: i64,
    pub pending: i64,
    pub status: String,
}

// ── Tunnel ───────────────────────────────────────────────────────────

pub type Tunnel = Object<TunnelSpec>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TunnelSpec {
    pub ha_mode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tunnel_endpoints: Vec<TunnelEndpoint>,
    #[serde(deserialize_with = "null_as_default")]
    pub policy_distribution_targets: Vec<String>,
    #[serde(rename = "disable-tcp-mss-adjust")]
    pub disable_tcp_mss_adjust: bool,
    /// Tunnel-wide lifetimes; the server may omit this block entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Lifetime>,
}

impl ResourceSpec for TunnelSpec {
    const KIND: &'static str = "Tunnel";
    const COLLECTION: Collection = Collection::Tunnels;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TunnelEndpoint {
    pub interface_name: String,
    pub dse: String,
    pub ike_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ike_sa: Option<IkeSa>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipsec_sa: Option<IpsecSa>,
    pub local_identifier: Identifier,
    pub remote_identifier: Identifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Lifetime>,
}

/// IKE (phase 1) security association parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IkeSa {
    #[serde(deserialize_with = "null_as_default")]
    pub encryption_algorithms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hash_algorithms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dh_groups: Vec<String>,
    pub rekey_lifetime: String,
    /// Write-only: accepted on create, never returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_shared_key: Option<String>,
    pub reauth_lifetime: String,
    pub dpd_delay: String,
    #[serde(rename = "ikev1-dpd-timeout")]
    pub ikev1_dpd_timeout: String,
    pub ike_initiator: bool,
    pub auth_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_identity_certificates: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub remote_ca_certificates: Vec<String>,
}

/// IPsec (phase 2) security association parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IpsecSa {
    #[serde(deserialize_with = "null_as_default")]
    pub encryption_algorithms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dh_groups: Vec<String>,
    pub rekey_lifetime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub id_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Lifetime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sa_lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ike_lifetime: Option<String>,
}

// ── NAT ──────────────────────────────────────────────────────────────

pub type NatPolicy = Object<NatPolicySpec>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NatPolicySpec {
    #[serde(deserialize_with = "null_as_default")]
    pub rules: Vec<NatRule>,
    #[serde(deserialize_with = "null_as_default")]
    pub policy_distribution_targets: Vec<String>,
}

impl ResourceSpec for NatPolicySpec {
    const KIND: &'static str = "NatPolicy";
    const COLLECTION: Collection = Collection::NatPolicies;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NatRule {
    pub name: String,
    pub disable: bool,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub source: AddressCollection,
    pub destination: AddressCollection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_proto_port: Option<ProtoPort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_source: Option<AddressCollection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_destination: Option<AddressCollection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_destination_port: Option<String>,
}

/// Literal addresses or named collection references. `any` is true iff
/// both lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressCollection {
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    #[serde(
        rename = "ipcollections",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub ip_collections: Vec<String>,
    pub any: bool,
}

impl AddressCollection {
    /// Build a collection, deriving the `any` flag.
    pub fn new(addresses: Vec<String>, ip_collections: Vec<String>) -> Self {
        let any = addresses.is_empty() && ip_collections.is_empty();
        Self {
            addresses,
            ip_collections,
            any,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtoPort {
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<String>,
}

// ── Role ─────────────────────────────────────────────────────────────

pub type Role = Object<RoleSpec>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RoleSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub permissions: Vec<Permission>,
}

impl ResourceSpec for RoleSpec {
    const KIND: &'static str = "Role";
    const COLLECTION: Collection = Collection::Roles;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Permission {
    pub resource_group: String,
    pub resource_kind: String,
    pub resource_namespace: String,
    #[serde(deserialize_with = "null_as_default")]
    pub actions: Vec<String>,
}

// ── IP collection ────────────────────────────────────────────────────

pub type IpCollection = Object<IpCollectionSpec>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IpCollectionSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_family: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    #[serde(rename = "ipcollections", deserialize_with = "null_as_default")]
    pub ip_collections: Vec<String>,
}

impl ResourceSpec for IpCollectionSpec {
    const KIND: &'static str = "IPCollection";
    const COLLECTION: Collection = Collection::IpCollections;
}
