//! Background prefix refresher
//!
//! The Refresher is responsible for:
//! - Performing one immediate fetch on start
//! - Re-fetching on a fixed interval
//! - Publishing each successful result to the [`PrefixStore`]
//! - Stopping cleanly when the lifetime token is cancelled
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  tick   ┌────────────────┐        ┌──────────────────────┐
//! │   Interval   │───────▶ │   Refresher    │──────▶ │    SourceSelector    │
//! └──────────────┘         └────────────────┘        │ privileged | public  │
//!                                  │                 └──────────────────────┘
//!                                  │ publish
//!                                  ▼
//!                          ┌────────────────┐
//!                          │  PrefixStore   │◀──── readers (request path)
//!                          └────────────────┘
//! ```
//!
//! ## Failure policy
//!
//! A failed cycle leaves the published set untouched. There is no retry or
//! backoff: the next attempt is the next tick.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RefreshSettings;
use crate::selector::{SourceMode, SourceSelector};
use crate::store::PrefixStore;
use crate::traits::SourceKind;

/// Events emitted by the Refresher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// Refresher started
    Started {
        mode: SourceMode,
    },

    /// A new prefix set was published
    Published {
        source: SourceKind,
        count: usize,
        generation: u64,
    },

    /// A cycle failed; the previous set is retained
    FetchFailed {
        source: SourceKind,
        error: String,
    },

    /// The privileged source failed and was abandoned for good
    Downgraded {
        error: String,
    },

    /// Refresher stopped
    Stopped,
}

/// Background refresher
///
/// ## Lifecycle
///
/// 1. Create with [`Refresher::new()`]
/// 2. Spawn [`Refresher::run()`] with the instance's lifetime token
/// 3. Cancel the token to stop it
///
/// ## Threading
///
/// The refresher is the single writer of its [`PrefixStore`]. Publishes are
/// totally ordered: one cycle completes before the next tick is awaited.
pub struct Refresher {
    /// Source selection and fallback state
    selector: SourceSelector,

    /// Published prefix set
    store: PrefixStore,

    /// Refresh period
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<RefreshEvent>,
}

impl Refresher {
    /// Create a new refresher
    ///
    /// # Returns
    ///
    /// A tuple of (refresher, event_receiver) where event_receiver yields refresh events
    pub fn new(
        selector: SourceSelector,
        store: PrefixStore,
        settings: &RefreshSettings,
    ) -> (Self, mpsc::Receiver<RefreshEvent>) {
        let (tx, rx) = mpsc::channel(settings.event_channel_capacity.max(1));

        let refresher = Self {
            selector,
            store,
            interval: crate::config::effective_interval(settings.interval),
            event_tx: tx,
        };

        (refresher, rx)
    }

    /// The effective refresh period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `cancel` fires
    ///
    /// Cancellation is observed only while waiting for the next tick; an
    /// in-flight fetch runs to completion or to its own deadline.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.emit_event(RefreshEvent::Started {
            mode: self.selector.mode(),
        });
        info!(
            "Starting prefix refresher (mode={:?}, interval={:?})",
            self.selector.mode(),
            self.interval
        );

        // Populate the store as soon as possible
        self.refresh_once().await;

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Shutdown signal received, stopping prefix refresher");
                    break;
                }

                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
            }
        }

        self.emit_event(RefreshEvent::Stopped);
    }

    /// Perform one fetch-and-publish cycle
    ///
    /// # Returns
    ///
    /// The published generation, or `None` when the cycle failed
    pub async fn refresh_once(&mut self) -> Option<u64> {
        let selection = self.selector.select().await;

        if let Some(error) = selection.downgraded_by {
            self.emit_event(RefreshEvent::Downgraded { error });
        }

        match selection.outcome {
            Ok(prefixes) => {
                let count = prefixes.len();
                let generation = self.store.publish(prefixes);
                info!(
                    "Published {} prefixes from {} source (generation {})",
                    count, selection.source, generation
                );
                self.emit_event(RefreshEvent::Published {
                    source: selection.source,
                    count,
                    generation,
                });
                Some(generation)
            }
            Err(e) => {
                warn!(
                    "Refresh from {} source failed, keeping {} previously published prefixes: {}",
                    selection.source,
                    self.store.len(),
                    e
                );
                self.emit_event(RefreshEvent::FetchFailed {
                    source: selection.source,
                    error: e.to_string(),
                });
                None
            }
        }
    }

    /// Emit a refresh event
    fn emit_event(&self, event: RefreshEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, event discarded");
            }
        }
    }
}
