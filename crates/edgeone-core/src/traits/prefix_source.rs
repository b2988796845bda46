// # Prefix Source Trait
//
// Defines the interface for acquiring the provider's trusted IP prefixes.
//
// ## Implementations
//
// - Privileged, zone-scoped origin ACL: `edgeone-source-teo` crate
// - Public, unauthenticated range list: `edgeone-source-public` crate
//
// ## Usage
//
// ```rust,ignore
// use edgeone_core::PrefixSource;
//
// #[tokio::main]
// async fn main() -> edgeone_core::Result<()> {
//     let source = /* PrefixSource implementation */;
//
//     let prefixes = source.fetch().await?;
//     println!("{} prefixes from {}", prefixes.len(), source.source_name());
//
//     Ok(())
// }
// ```

use std::fmt;

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::prefix::Prefix;

/// Which upstream a source talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Authenticated, zone-scoped API requiring signed requests
    Privileged,
    /// Unauthenticated, provider-wide range list
    Public,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privileged => "privileged",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for prefix source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Single-shot
///
/// A call to [`fetch`](PrefixSource::fetch) performs one acquisition and
/// returns. Sources do not:
/// - Retry or back off (the next attempt is the refresher's next tick)
/// - Spawn tasks
/// - Cache results between calls (the `PrefixStore` owns published state)
/// - Decide which upstream to use (owned by `SourceSelector`)
///
/// # Fail-fast
///
/// Either the complete prefix list is returned, or an error. A single
/// unparseable entry fails the whole fetch.
#[async_trait]
pub trait PrefixSource: Send + Sync {
    /// Fetch the complete current prefix list
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Prefix>)`: Every prefix, in upstream order
    /// - `Err(Error)`: Transport, API, or parse failure
    async fn fetch(&self) -> Result<Vec<Prefix>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing prefix sources from configuration
pub trait PrefixSourceFactory: Send + Sync {
    /// Create a PrefixSource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: The validated source configuration
    ///
    /// # Returns
    ///
    /// A boxed PrefixSource trait object
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn PrefixSource>, crate::Error>;
}
