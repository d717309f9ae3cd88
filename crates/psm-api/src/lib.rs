// psm-api: async client and wire types for the policy manager's config API

pub mod client;
pub mod collection;
mod de;
pub mod error;
pub mod transport;
pub mod types;

pub use client::PsmClient;
pub use collection::Collection;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
