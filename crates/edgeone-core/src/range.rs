//! EdgeOne IP range instance
//!
//! [`EdgeOneIpRange`] is what the host holds: it validates configuration,
//! starts the background refresher, and answers reader calls from the
//! published snapshot.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::prefix::Prefix;
use crate::refresher::{RefreshEvent, Refresher};
use crate::registry::SourceRegistry;
use crate::selector::SourceSelector;
use crate::store::PrefixStore;
use crate::traits::SourceKind;

/// A provisioned, self-refreshing set of EdgeOne origin IP ranges
pub struct EdgeOneIpRange {
    /// Published prefix set (shared with the refresher)
    store: PrefixStore,

    /// Lifetime signal for the refresher task
    cancel: CancellationToken,

    /// Refresher task handle, taken on shutdown
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl EdgeOneIpRange {
    /// Validate `config`, build the sources, and start refreshing
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// - `Ok((instance, event_receiver))`: The refresher is running
    /// - `Err(Error::Config)`: Invalid configuration; nothing was started
    pub fn provision(
        config: SourceConfig,
        registry: &SourceRegistry,
        cancel: CancellationToken,
    ) -> Result<(Self, mpsc::Receiver<RefreshEvent>)> {
        config.validate()?;

        let public = registry.create_source(SourceKind::Public, &config)?;
        let privileged = if config.has_credentials() {
            Some(registry.create_source(SourceKind::Privileged, &config)?)
        } else {
            info!("Credentials incomplete, using public source only");
            None
        };

        let settings = config.refresh_settings();
        let selector = SourceSelector::new(privileged, public, settings.timeout);
        let store = PrefixStore::new();
        let (refresher, event_rx) = Refresher::new(selector, store.clone(), &settings);

        let handle = tokio::spawn(refresher.run(cancel.clone()));

        Ok((
            Self {
                store,
                cancel,
                handle: Mutex::new(Some(handle)),
            },
            event_rx,
        ))
    }

    /// The currently published prefixes
    ///
    /// Never blocks on network I/O. Empty until the first successful fetch.
    pub fn get_ip_ranges(&self) -> Arc<[Prefix]> {
        self.store.current()
    }

    /// Whether `ip` belongs to the published ranges
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.store.contains(ip)
    }

    /// Generation of the published set (0 before the first publish)
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    /// A reader handle onto the published set
    pub fn store(&self) -> PrefixStore {
        self.store.clone()
    }

    /// Stop the refresher and wait for it to exit
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel.cancel();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| Error::Other(format!("Refresher task failed: {}", e)))?;
        }

        Ok(())
    }
}

impl Drop for EdgeOneIpRange {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
