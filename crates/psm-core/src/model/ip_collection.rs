// ── IP collection desired state ──

use serde::{Deserialize, Serialize};

use super::common::default_scope;

/// A named group of addresses that rules can reference by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpCollectionConfig {
    pub name: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_family: Option<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default, alias = "ipcollections")]
    pub ip_collections: Vec<String>,
}
