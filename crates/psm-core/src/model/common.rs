// ── Shared building blocks ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Tenant, namespace and distribution target used when none is given.
pub const DEFAULT_SCOPE: &str = "default";

pub(crate) fn default_scope() -> String {
    DEFAULT_SCOPE.to_owned()
}

pub(crate) fn default_target_list() -> Vec<String> {
    vec![default_scope()]
}

pub(crate) fn default_target_set() -> BTreeSet<String> {
    BTreeSet::from([default_scope()])
}

pub(crate) fn default_true() -> bool {
    true
}

/// Literal addresses and/or named IP collection references.
///
/// A block with both lists empty means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressBlock {
    pub addresses: Vec<String>,
    #[serde(alias = "ipcollections")]
    pub ip_collections: Vec<String>,
}

impl AddressBlock {
    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ip_collections: Vec::new(),
        }
    }

    pub fn from_collections<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: Vec::new(),
            ip_collections: collections.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_any(&self) -> bool {
        self.addresses.is_empty() && self.ip_collections.is_empty()
    }
}
