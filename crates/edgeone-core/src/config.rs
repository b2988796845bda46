//! Configuration types for the EdgeOne IP range source
//!
//! [`SourceConfig`] mirrors the host's config block. It is validated once at
//! provisioning and never mutated afterwards.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Refresh period used when `interval` is zero or unset
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Longest accepted `interval` or `timeout` (one year)
pub const MAX_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const AREA_GLOBAL: &str = "global";
const AREA_MAINLAND_CHINA: &str = "mainland-china";
const AREA_OVERSEAS: &str = "overseas";

/// Source configuration block
///
/// Recognized keys: `zone_id`, `secret_id`, `secret_key`, `area`, `version`,
/// `interval`, `timeout`, `event_channel_capacity`. Any other key is rejected.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// EdgeOne zone whose origin ACL is queried
    #[serde(default)]
    pub zone_id: String,

    /// TencentCloud API secret id
    #[serde(default)]
    pub secret_id: String,

    /// TencentCloud API secret key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub secret_key: String,

    /// Area filter for the public endpoint: `global`, `mainland-china`,
    /// `overseas`, or empty for all
    #[serde(default)]
    pub area: String,

    /// IP version filter: `v4`, `v6`, or empty for both
    #[serde(default)]
    pub version: String,

    /// Refresh interval in seconds (0 = one hour)
    #[serde(default)]
    pub interval: u64,

    /// Per-fetch timeout in seconds (0 = none)
    #[serde(default)]
    pub timeout: u64,

    /// Capacity of the refresh event channel
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

// Custom Debug implementation that hides the secret key
impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("zone_id", &self.zone_id)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<REDACTED>")
            .field("area", &self.area)
            .field("version", &self.version)
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .field("event_channel_capacity", &self.event_channel_capacity)
            .finish()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceConfig {
    /// Create an empty configuration (public source, both IP versions, all areas)
    pub fn new() -> Self {
        Self {
            zone_id: String::new(),
            secret_id: String::new(),
            secret_key: String::new(),
            area: String::new(),
            version: String::new(),
            interval: 0,
            timeout: 0,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the privileged-source credentials
    pub fn with_credentials(
        mut self,
        zone_id: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.zone_id = zone_id.into();
        self.secret_id = secret_id.into();
        self.secret_key = secret_key.into();
        self
    }

    /// Set the IP version filter
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the area filter
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    /// Set the refresh interval (seconds)
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval = secs;
        self
    }

    /// Set the per-fetch timeout (seconds)
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        IpVersionFilter::from_config(&self.version)?;
        Area::from_config(&self.area)?;

        if self.interval > MAX_DURATION.as_secs() {
            return Err(Error::config(format!(
                "interval must be at most {} seconds, got {}",
                MAX_DURATION.as_secs(),
                self.interval
            )));
        }
        if self.timeout > MAX_DURATION.as_secs() {
            return Err(Error::config(format!(
                "timeout must be at most {} seconds, got {}",
                MAX_DURATION.as_secs(),
                self.timeout
            )));
        }

        if self.event_channel_capacity == 0 {
            return Err(Error::config("event_channel_capacity must be > 0"));
        }

        Ok(())
    }

    /// True when all three privileged credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.zone_id.is_empty() && !self.secret_id.is_empty() && !self.secret_key.is_empty()
    }

    /// The parsed IP version filter
    pub fn version_filter(&self) -> Result<IpVersionFilter> {
        IpVersionFilter::from_config(&self.version)
    }

    /// The parsed area filter
    pub fn area_filter(&self) -> Result<Option<Area>> {
        Area::from_config(&self.area)
    }

    /// Refresh cadence derived from this configuration
    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            interval: effective_interval(Duration::from_secs(self.interval)),
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            event_channel_capacity: self.event_channel_capacity,
        }
    }
}

/// IP version filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersionFilter {
    /// Both IPv4 and IPv6
    #[default]
    Any,
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl IpVersionFilter {
    /// Parse the `version` config value
    pub fn from_config(value: &str) -> Result<Self> {
        match value {
            "" => Ok(Self::Any),
            "v4" => Ok(Self::V4),
            "v6" => Ok(Self::V6),
            other => Err(Error::config(format!(
                "invalid version: {:?} (must be \"v4\" or \"v6\")",
                other
            ))),
        }
    }

    /// The query parameter value, if this filter narrows the result
    pub fn as_query_value(&self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::V4 => Some("v4"),
            Self::V6 => Some("v6"),
        }
    }

    pub fn includes_v4(&self) -> bool {
        !matches!(self, Self::V6)
    }

    pub fn includes_v6(&self) -> bool {
        !matches!(self, Self::V4)
    }
}

/// Area filter for the public endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    Global,
    MainlandChina,
    Overseas,
}

impl Area {
    /// Parse the `area` config value; empty means no filter
    pub fn from_config(value: &str) -> Result<Option<Self>> {
        match value {
            "" => Ok(None),
            AREA_GLOBAL => Ok(Some(Self::Global)),
            AREA_MAINLAND_CHINA => Ok(Some(Self::MainlandChina)),
            AREA_OVERSEAS => Ok(Some(Self::Overseas)),
            other => Err(Error::config(format!(
                "invalid area: {:?} (must be {:?}, {:?} or {:?})",
                other, AREA_GLOBAL, AREA_MAINLAND_CHINA, AREA_OVERSEAS
            ))),
        }
    }

    /// The wire value used in the `area` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => AREA_GLOBAL,
            Self::MainlandChina => AREA_MAINLAND_CHINA,
            Self::Overseas => AREA_OVERSEAS,
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refresh cadence settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Period between refreshes (never zero)
    pub interval: Duration,

    /// Deadline for each source attempt, if any
    pub timeout: Option<Duration>,

    /// Capacity of the refresh event channel
    pub event_channel_capacity: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            timeout: None,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Zero maps to [`DEFAULT_REFRESH_INTERVAL`], anything longer than
/// [`MAX_DURATION`] is clamped to it
pub fn effective_interval(configured: Duration) -> Duration {
    if configured.is_zero() {
        DEFAULT_REFRESH_INTERVAL
    } else {
        configured.min(MAX_DURATION)
    }
}

fn default_event_channel_capacity() -> usize {
    64
}
