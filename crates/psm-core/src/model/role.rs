// ── Role desired state ──

use serde::{Deserialize, Serialize};

use super::common::default_scope;

/// Namespace every permission is sent with, whatever was declared.
pub const ALL_NAMESPACES: &str = "*_ALL_*";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub name: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default)]
    pub permissions: Vec<PermissionConfig>,
}

/// One grant. `resource_namespace` is accepted for compatibility but the
/// server only honours [`ALL_NAMESPACES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub resource_group: String,
    pub resource_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_namespace: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}
