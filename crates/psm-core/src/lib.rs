//! Reconciliation engine between declarative desired state and the policy
//! manager's config API.
//!
//! - **Desired-state model** ([`model`]) — flat records for security
//!   policies, embedded rules, IPsec tunnels, NAT policies, roles and IP
//!   collections, with `"default"` identity fields and singleton blocks.
//!
//! - **Validators** ([`validate`]) — structural checks run before anything
//!   is sent, reporting the first failure with its rule index.
//!
//! - **Expanders / flatteners** ([`expand`], [`flatten`]) — pure mapping to
//!   and from `psm-api` wire documents. Flattening merges with the previously
//!   stored record so write-only fields (the pre-shared key) and omitted
//!   lifetimes survive a read.
//!
//! - **[`Reconciler`]** — async create / read / delete per resource kind,
//!   storing results through the [`StateStore`] contract.

pub mod convert;
pub mod error;
pub mod expand;
pub mod flatten;
pub mod model;
pub mod resource;
pub mod state;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use resource::Reconciler;
pub use state::{ResourceState, StateStore, decode_config};
pub use validate::ValidationError;
