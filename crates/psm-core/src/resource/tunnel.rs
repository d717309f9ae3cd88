// Tunnel operations
//
// `/configs/network/v1/tenant/{tenant}/tunnels`

use psm_api::types::{ResourceSpec, Tunnel, TunnelSpec};
use tracing::debug;

use super::{Reconciler, Scoped, record};
use crate::error::CoreError;
use crate::expand::expand_tunnel;
use crate::flatten::flatten_tunnel;
use crate::model::TunnelConfig;
use crate::state::StateStore;
use crate::validate::validate_tunnel;

impl Scoped for TunnelConfig {
    fn scope(&self) -> (String, String) {
        (self.tenant.clone(), self.name.clone())
    }
}

impl Reconciler {
    /// Validate, `POST` the tunnel, then read it back.
    pub async fn create_tunnel(
        &self,
        state: &mut (impl StateStore<TunnelConfig> + Send),
    ) -> Result<(), CoreError> {
        let config = state.config();
        if let Some(block) = &config.tunnel {
            validate_tunnel(block)?;
        }
        let document = expand_tunnel(config);
        debug!(
            kind = TunnelSpec::KIND,
            name = %document.meta.name,
            tenant = %document.meta.tenant,
            "creating"
        );

        let id = self.create_document(&document).await?;
        state.set_id(Some(id));
        self.read_tunnel(state).await
    }

    /// Refresh stored state, keeping the pre-shared key and any lifetimes
    /// the server leaves out.
    pub async fn read_tunnel(
        &self,
        state: &mut (impl StateStore<TunnelConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = TunnelSpec::KIND, %name, %tenant, "reading");

        let tunnel: Tunnel = self.fetch(&tenant, &name).await?;
        let config = flatten_tunnel(&tunnel, Some(state.config()));
        record(state, tunnel.meta, config);
        Ok(())
    }

    pub async fn delete_tunnel(
        &self,
        state: &mut (impl StateStore<TunnelConfig> + Send),
    ) -> Result<(), CoreError> {
        let (tenant, name) = state.config().scope();
        debug!(kind = TunnelSpec::KIND, %name, %tenant, "deleting");
        self.delete_document::<TunnelSpec, _>(state, &tenant, &name).await
    }
}
