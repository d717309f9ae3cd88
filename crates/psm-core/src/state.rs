// ── Desired-state store contract ──
//
// Resource operations read the previously applied record from, and write the
// reconciled record back to, a store owned by the caller (normally a
// declarative engine). `ResourceState` is the in-memory implementation used
// when there is no such engine, and in tests.

use psm_api::types::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Typed get/set access to one managed object's stored state.
pub trait StateStore<C> {
    /// Server-assigned identifier; `None` means the object does not exist.
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: Option<String>);

    /// The last applied desired state.
    fn config(&self) -> &C;
    fn set_config(&mut self, config: C);

    /// Server metadata from the last successful read.
    fn meta(&self) -> Option<&ObjectMeta>;
    fn set_meta(&mut self, meta: Option<ObjectMeta>);
}

/// Snapshot of one managed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState<C> {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub meta: Option<ObjectMeta>,
    pub config: C,
}

impl<C> ResourceState<C> {
    /// State for an object that has not been created yet.
    pub fn new(config: C) -> Self {
        Self {
            id: None,
            meta: None,
            config,
        }
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}

impl<C> StateStore<C> for ResourceState<C> {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn config(&self) -> &C {
        &self.config
    }

    fn set_config(&mut self, config: C) {
        self.config = config;
    }

    fn meta(&self) -> Option<&ObjectMeta> {
        self.meta.as_ref()
    }

    fn set_meta(&mut self, meta: Option<ObjectMeta>) {
        self.meta = meta;
    }
}

/// Decode a stored desired-state record.
///
/// Shape problems (a missing required field, a singleton block given more
/// than once) are contract errors, distinct from validation failures.
pub fn decode_config<C: DeserializeOwned>(value: serde_json::Value) -> Result<C, CoreError> {
    serde_json::from_value(value).map_err(|e| CoreError::Contract {
        message: e.to_string(),
    })
}
