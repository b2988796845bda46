//! Plugin-based source registry
//!
//! The registry lets prefix sources be registered at runtime by their
//! plugin crates, so the core never names a concrete source.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use edgeone_core::{SourceConfig, SourceKind, SourceRegistry};
//!
//! let registry = SourceRegistry::new();
//! edgeone_source_teo::register(&registry);
//! edgeone_source_public::register(&registry);
//!
//! let public = registry.create_source(SourceKind::Public, &SourceConfig::new())?;
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::traits::{PrefixSource, PrefixSourceFactory, SourceKind};

/// Registry of prefix source factories
///
/// Each instance owns its own registry; there is no process-wide state.
///
/// ## Thread Safety
///
/// Interior mutability with RwLock allows concurrent reads and exclusive writes.
#[derive(Default)]
pub struct SourceRegistry {
    /// Registered source factories
    sources: RwLock<HashMap<SourceKind, Box<dyn PrefixSourceFactory>>>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source factory, replacing any previous one for that kind
    pub fn register_source(&self, kind: SourceKind, factory: Box<dyn PrefixSourceFactory>) {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        sources.insert(kind, factory);
    }

    /// Create a source of the given kind from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn PrefixSource>)`: Created source instance
    /// - `Err(Error::Config)`: If the kind is not registered or creation fails
    pub fn create_source(&self, kind: SourceKind, config: &SourceConfig) -> Result<Box<dyn PrefixSource>> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);

        let factory = sources
            .get(&kind)
            .ok_or_else(|| Error::config(format!("No {} source registered", kind)))?;

        factory.create(config)
    }

    /// List all registered source kinds
    pub fn list_sources(&self) -> Vec<SourceKind> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources.keys().copied().collect()
    }

    /// Check if a source kind is registered
    pub fn has_source(&self, kind: SourceKind) -> bool {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources.contains_key(&kind)
    }
}
