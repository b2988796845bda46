// # Prefix Store
//
// The currently published prefix set.
//
// ## Concurrency
//
// - Exactly one writer (the `Refresher`) and any number of readers
// - Readers are synchronous and never wait on network I/O
// - The write lock is held only for the snapshot swap; the new set is
//   built outside the lock
// - A publish either replaces the whole set or leaves it untouched
//
// ## Lifetime
//
// Starts empty. Never cleared: a failed refresh keeps the last good set.

use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};

use crate::prefix::Prefix;

/// One published generation of the prefix set
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Monotonic publish counter; 0 before the first publish
    pub generation: u64,
    /// The published prefixes (read-only)
    pub prefixes: Arc<[Prefix]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            prefixes: Arc::from(Vec::new()),
        }
    }
}

/// Shared handle to the published prefix set
///
/// Cloning is cheap; all clones observe the same set.
///
/// # Example
///
/// ```rust
/// use edgeone_core::{Prefix, PrefixStore};
///
/// let store = PrefixStore::new();
/// assert!(store.is_empty());
///
/// store.publish(vec!["10.0.0.0/8".parse::<Prefix>().unwrap()]);
/// assert_eq!(store.current().len(), 1);
/// assert!(store.contains(&"10.1.2.3".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrefixStore {
    inner: Arc<RwLock<Snapshot>>,
}

impl PrefixStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published set, returning the new generation
    pub fn publish(&self, prefixes: Vec<Prefix>) -> u64 {
        let prefixes: Arc<[Prefix]> = Arc::from(prefixes);

        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.generation += 1;
        guard.prefixes = prefixes;
        guard.generation
    }

    /// The live snapshot of published prefixes
    pub fn current(&self) -> Arc<[Prefix]> {
        self.snapshot().prefixes
    }

    /// The live snapshot together with its generation
    pub fn snapshot(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Generation of the current snapshot
    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Whether `ip` is inside any published prefix
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.current().iter().any(|prefix| prefix.contains(ip))
    }

    /// Number of published prefixes
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// Whether nothing has been published yet (or an empty set was)
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }
}
