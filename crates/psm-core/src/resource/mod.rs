// ── Resource operations ──
//
// Create / read / delete for every managed kind. Each kind lives in its own
// file as an inherent `impl Reconciler` block. There is no in-place update:
// identity fields are immutable, so a changed record is deleted and created
// again by the caller.

mod ip_collection;
mod nat;
mod policy;
mod role;
mod rule;
mod tunnel;

use psm_api::PsmClient;
use psm_api::types::{Object, ObjectMeta, ResourceSpec};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::state::StateStore;

/// Runs resource operations against one policy manager.
///
/// Holds nothing but the client, so it can be cloned freely and shared by
/// operations on independent objects.
#[derive(Debug, Clone)]
pub struct Reconciler {
    client: PsmClient,
}

impl Reconciler {
    pub fn new(client: PsmClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PsmClient {
        &self.client
    }

    // ── Shared document plumbing ─────────────────────────────────────

    /// `POST` a new document and return the uuid the server assigned.
    async fn create_document<S, T>(&self, document: &Object<S, T>) -> Result<String, CoreError>
    where
        S: ResourceSpec,
        T: Serialize + DeserializeOwned + Sync,
    {
        let created: Object<S, T> = self.client.create_object(document).await?;
        uuid_of::<S>(&created.meta)
    }

    async fn fetch<S, T>(&self, tenant: &str, name: &str) -> Result<Object<S, T>, CoreError>
    where
        S: ResourceSpec,
        T: DeserializeOwned,
    {
        Ok(self.client.get_object(tenant, name).await?)
    }

    async fn delete_document<S, C>(
        &self,
        state: &mut (impl StateStore<C> + Send),
        tenant: &str,
        name: &str,
    ) -> Result<(), CoreError>
    where
        S: ResourceSpec,
    {
        self.client.delete_object::<S>(tenant, name).await?;
        forget(state);
        Ok(())
    }
}

// ── State helpers ───────────────────────────────────────────────────

/// Identity of a top-level record, as owned `(tenant, name)`.
trait Scoped {
    fn scope(&self) -> (String, String);
}

fn uuid_of<S: ResourceSpec>(meta: &ObjectMeta) -> Result<String, CoreError> {
    meta.uuid.clone().ok_or_else(|| CoreError::Decode {
        message: format!("{} {} came back without a uuid", S::KIND, meta.name),
        body: String::new(),
    })
}

/// Store a freshly read record and its server metadata.
fn record<C>(state: &mut impl StateStore<C>, meta: ObjectMeta, config: C) {
    if let Some(uuid) = &meta.uuid {
        state.set_id(Some(uuid.clone()));
    }
    state.set_meta(Some(meta));
    state.set_config(config);
}

/// Mark the object as gone.
fn forget<C>(state: &mut impl StateStore<C>) {
    state.set_id(None);
    state.set_meta(None);
}
