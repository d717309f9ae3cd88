// ── Desired-state model ──
//
// The flat, partially-specified records a declarative engine stores for each
// managed object. Expanders turn these into wire documents; flatteners turn
// wire documents (plus the previous record) back into these.

pub mod common;

pub mod ip_collection;
pub mod nat;
pub mod policy;
pub mod role;
pub mod tunnel;

// ── Re-exports ──────────────────────────────────────────────────────

pub use common::{AddressBlock, DEFAULT_SCOPE};
pub use ip_collection::IpCollectionConfig;
pub use nat::{NatPolicyConfig, NatRuleConfig, ProtoPortConfig, STATIC_NAT};
pub use policy::{PolicyConfig, RuleAction, RuleConfig, RuleEntryConfig};
pub use role::{ALL_NAMESPACES, PermissionConfig, RoleConfig};
pub use tunnel::{
    AuthType, EndpointConfig, IdentifierConfig, IkeSaConfig, IpsecSaConfig, LifetimeConfig,
    TunnelBlock, TunnelConfig,
};
