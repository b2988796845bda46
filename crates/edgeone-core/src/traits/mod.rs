//! Core traits for the EdgeOne IP range system
//!
//! - [`PrefixSource`]: Fetch the current trusted prefix list from one upstream
//! - [`PrefixSourceFactory`]: Build a source from configuration

pub mod prefix_source;

pub use prefix_source::{PrefixSource, PrefixSourceFactory, SourceKind};
