// # Public IP Range Source
//
// Unauthenticated source: fetches the full EdgeOne edge IP list from the
// public endpoint.
//
// ## Purpose
//
// This is the **fallback source**. It is used when no credentials are
// configured, and permanently after the privileged source fails once.
//
// ## Wire Format
//
// `GET https://api.edgeone.ai/ips?version=<v4|v6>&area=<area>`, answered
// with one CIDR (or bare address) per line. Each query parameter is sent
// only when its filter is set.

use async_trait::async_trait;
use edgeone_core::prefix::Prefix;
use edgeone_core::traits::{PrefixSource, PrefixSourceFactory, SourceKind};
use edgeone_core::{Area, Error, IpVersionFilter, Result, SourceConfig, SourceRegistry};
use std::time::Duration;
use tracing::debug;

/// Public EdgeOne IP list endpoint
pub const PUBLIC_IPS_ENDPOINT: &str = "https://api.edgeone.ai/ips";

/// Bound on establishing the TCP connection
///
/// The whole fetch is bounded by the configured timeout, not by the client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Public EdgeOne IP range source
#[derive(Debug)]
pub struct PublicIpSource {
    /// URL to fetch the list from
    endpoint: String,

    /// IP version filter
    version: IpVersionFilter,

    /// Area filter (None = all areas)
    area: Option<Area>,

    /// HTTP client
    client: reqwest::Client,
}

impl PublicIpSource {
    /// Create a new public source against the production endpoint
    pub fn new(version: IpVersionFilter, area: Option<Area>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: PUBLIC_IPS_ENDPOINT.to_string(),
            version,
            area,
            client,
        })
    }

    /// Use a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Query parameters for the given filters
pub fn build_query(version: IpVersionFilter, area: Option<Area>) -> Vec<(&'static str, &'static str)> {
    let mut query = Vec::with_capacity(2);
    if let Some(version) = version.as_query_value() {
        query.push(("version", version));
    }
    if let Some(area) = area {
        query.push(("area", area.as_str()));
    }
    query
}

/// Parse a newline-delimited prefix list
///
/// Blank lines are skipped and surrounding whitespace (including `\r`) is
/// ignored. The first malformed line fails the whole list.
pub fn parse_prefix_list(body: &str) -> Result<Vec<Prefix>> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Prefix::parse_cidr_expression)
        .collect()
}

#[async_trait]
impl PrefixSource for PublicIpSource {
    async fn fetch(&self) -> Result<Vec<Prefix>> {
        let query = build_query(self.version, self.area);
        debug!("Fetching public EdgeOne IP list from {} with query {:?}", self.endpoint, query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::http(format!("Public IP list request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!("Public IP list returned HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read public IP list: {}", e)))?;

        parse_prefix_list(&body)
    }

    fn source_name(&self) -> &'static str {
        "edgeone-public"
    }
}

/// Factory for creating public sources
pub struct PublicFactory;

impl PrefixSourceFactory for PublicFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn PrefixSource>> {
        let source = PublicIpSource::new(config.version_filter()?, config.area_filter()?)?;
        Ok(Box::new(source))
    }
}

/// Register the public source with a registry
pub fn register(registry: &SourceRegistry) {
    registry.register_source(SourceKind::Public, Box::new(PublicFactory));
}
