// # edgeone-core
//
// Core library for keeping the EdgeOne edge network's origin-facing IP
// ranges fresh, so a reverse proxy or firewall can tell whether an inbound
// connection really comes from the edge.
//
// ## Architecture Overview
//
// - **PrefixSource**: Trait for one upstream that yields the full prefix list
// - **SourceSelector**: Privileged vs public choice with sticky fallback
// - **Refresher**: Background task that fetches on a fixed interval
// - **PrefixStore**: Published snapshot, read concurrently by the request path
// - **SourceRegistry**: Plugin-based registry of source factories
// - **EdgeOneIpRange**: The provisioned instance a host holds
//
// ## Design Principles
//
// 1. **Readers never wait on I/O**: only the refresher touches the network
// 2. **Stale beats empty**: a failed refresh keeps the last good set
// 3. **One-way fallback**: privileged → public, never back
// 4. **Plugin-Based**: sources register themselves, no hard-coded if-else

pub mod config;
pub mod error;
pub mod prefix;
pub mod range;
pub mod refresher;
pub mod registry;
pub mod selector;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{Area, IpVersionFilter, RefreshSettings, SourceConfig};
pub use error::{Error, Result};
pub use prefix::Prefix;
pub use range::EdgeOneIpRange;
pub use refresher::{RefreshEvent, Refresher};
pub use registry::SourceRegistry;
pub use selector::{SourceMode, SourceSelector};
pub use store::{PrefixStore, Snapshot};
pub use traits::{PrefixSource, PrefixSourceFactory, SourceKind};

// Re-exported so hosts need not depend on tokio-util directly
pub use tokio_util::sync::CancellationToken;
