//! Source selection with sticky fallback
//!
//! The selector decides, per refresh cycle, which upstream to ask:
//!
//! ```text
//!   ┌────────────┐   any privileged error   ┌────────┐
//!   │ Privileged │ ───────────────────────▶ │ Public │ (terminal)
//!   └────────────┘                          └────────┘
//! ```
//!
//! A failed privileged fetch downgrades permanently and falls through to
//! the public source in the same cycle. There is no re-promotion.
//!
//! The selector is owned by the refresher task, so the mode needs no
//! synchronization.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::prefix::Prefix;
use crate::traits::{PrefixSource, SourceKind};

/// Which upstream the selector currently uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Authenticated zone-scoped origin ACL
    Privileged,
    /// Public range list; never left once entered
    Public,
}

impl SourceMode {
    /// The source kind this mode reads from
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Privileged => SourceKind::Privileged,
            Self::Public => SourceKind::Public,
        }
    }
}

/// Result of one selection cycle
#[derive(Debug)]
pub struct Selection {
    /// Source that produced the outcome
    pub source: SourceKind,
    /// Set when this cycle downgraded from privileged to public
    pub downgraded_by: Option<String>,
    /// Fetched prefixes, or the error of the last attempted source
    pub outcome: Result<Vec<Prefix>>,
}

/// Chooses between the privileged and public sources
pub struct SourceSelector {
    /// Privileged source, present only when credentials were configured
    privileged: Option<Box<dyn PrefixSource>>,

    /// Public source (always available)
    public: Box<dyn PrefixSource>,

    /// Current mode
    mode: SourceMode,

    /// Deadline for each source attempt
    timeout: Option<Duration>,
}

impl SourceSelector {
    /// Create a selector
    ///
    /// Starts in [`SourceMode::Privileged`] only when a privileged source is given.
    pub fn new(
        privileged: Option<Box<dyn PrefixSource>>,
        public: Box<dyn PrefixSource>,
        timeout: Option<Duration>,
    ) -> Self {
        let mode = if privileged.is_some() {
            SourceMode::Privileged
        } else {
            SourceMode::Public
        };

        Self {
            privileged,
            public,
            mode,
            timeout,
        }
    }

    /// Current mode
    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Fetch the current prefix set from the active source
    ///
    /// The timeout bounds each attempt separately. A cycle that downgrades
    /// makes two attempts, so it can take up to twice the timeout.
    pub async fn fetch_current(&mut self) -> Result<Vec<Prefix>> {
        self.select().await.outcome
    }

    /// Run one selection cycle, reporting which source answered
    ///
    /// Worst case is two full timeouts: the privileged attempt expires, then
    /// the public attempt expires.
    pub async fn select(&mut self) -> Selection {
        let mut downgraded_by = None;

        if let (SourceMode::Privileged, Some(privileged)) = (self.mode, self.privileged.as_deref()) {
            match bounded_fetch(privileged, self.timeout).await {
                Ok(prefixes) => {
                    return Selection {
                        source: SourceKind::Privileged,
                        downgraded_by: None,
                        outcome: Ok(prefixes),
                    };
                }
                Err(e) => {
                    warn!(
                        "Privileged source {} failed, falling back to public source permanently: {}",
                        privileged.source_name(),
                        e
                    );
                    downgraded_by = Some(e.to_string());
                    self.downgrade();
                }
            }
        }

        Selection {
            source: SourceKind::Public,
            downgraded_by,
            outcome: bounded_fetch(self.public.as_ref(), self.timeout).await,
        }
    }

    /// The only allowed transition: Privileged → Public
    fn downgrade(&mut self) {
        if self.mode == SourceMode::Privileged {
            info!("Source mode: privileged -> public");
        }
        self.mode = SourceMode::Public;
        self.privileged = None;
    }
}

async fn bounded_fetch(source: &dyn PrefixSource, timeout: Option<Duration>) -> Result<Vec<Prefix>> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch())
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => source.fetch().await,
    }
}
