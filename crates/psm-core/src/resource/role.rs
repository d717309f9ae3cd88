// Role operations
//
// `/configs/auth/v1/tenant/{tenant}/roles`

use psm_api::types::{ResourceSpec, Role, RoleSpec};
use tracing::debug;

use super::{Reconciler, Scoped, record};
use crate::error::CoreError;
use crate::expand::expand_role;
use crate::flatten::flatten_role;
use crate::model::RoleConfig;
use crate::state::StateStore;
use crate::validate::validate_permissions;

impl Scoped for RoleConfig {
    fn scope(&self) -> (String, String) {
        (self.tenant.clone(), self.name.clone())
    }
}

impl Reconciler {
    pub async fn create_role(
        &self,
        state: &mut (impl StateStore<RoleConfig> + Send),
    ) -> Result<(), CoreError> {
        let config = state.config();
        validate_permissions(&config.permissions)?;
        let document = expand_role(config);
        debug!(
            kind = RoleSpec::KIND,
            name = %document.meta.name,
            tenant = %document.meta.tenant,
            "creating"
        );

        let id = self.create_document(&document).await?;
        state.set_id(Some(id));
        self.read_role(state).await
    }

    /// Refresh stored state. `resource_namespace` is dropped from every
    /// permission.
    pub async fn read_role(
        &self,
        state: &mut (impl StateStore<RoleConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = RoleSpec::KIND, %name, %tenant, "reading");

        let role: Role = self.fetch(&tenant, &name).await?;
        let config = flatten_role(&role);
        record(state, role.meta, config);
        Ok(())
    }

    pub async fn delete_role(
        &self,
        state: &mut (impl StateStore<RoleConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = RoleSpec::KIND, %name, %tenant, "deleting");
        self.delete_document::<RoleSpec, _>(state, &tenant, &name).await
    }
}
