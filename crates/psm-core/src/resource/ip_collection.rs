// IP collection operations
//
// `/configs/network/v1/tenant/{tenant}/ipcollections`

use psm_api::types::{IpCollection, IpCollectionSpec, ResourceSpec};
use tracing::debug;

use super::{Reconciler, Scoped, record};
use crate::error::CoreError;
use crate::expand::expand_ip_collection;
use crate::flatten::flatten_ip_collection;
use crate::model::IpCollectionConfig;
use crate::state::StateStore;

impl Scoped for IpCollectionConfig {
    fn scope(&self) -> (String, String) {
        (self.tenant.clone(), self.name.clone())
    }
}

impl Reconciler {
    pub async fn create_ip_collection(
        &self,
        state: &mut (impl StateStore<IpCollectionConfig> + Send),
    ) -> Result<(), CoreError> {
        let document = expand_ip_collection(state.config());
        debug!(
            kind = IpCollectionSpec::KIND,
            name = %document.meta.name,
            tenant = %document.meta.tenant,
            "creating"
        );

        let id = self.create_document(&document).await?;
        state.set_id(Some(id));
        self.read_ip_collection(state).await
    }

    pub async fn read_ip_collection(
        &self,
        state: &mut (impl StateStore<IpCollectionConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = IpCollectionSpec::KIND, %name, %tenant, "reading");

        let collection: IpCollection = self.fetch(&tenant, &name).await?;
        let config = flatten_ip_collection(&collection);
        record(state, collection.meta, config);
        Ok(())
    }

    pub async fn delete_ip_collection(
        &self,
        state: &mut (impl StateStore<IpCollectionConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = IpCollectionSpec::KIND, %name, %tenant, "deleting");
        self.delete_document::<IpCollectionSpec, _>(state, &tenant, &name).await
    }
}
