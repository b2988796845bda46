// # TEO Origin ACL Source
//
// Privileged prefix source: asks the TencentCloud TEO API for the origin ACL
// of one EdgeOne zone, using a TC3-HMAC-SHA256 signed `DescribeOriginACL` call.
//
// ## Behavior
//
// - One signed POST per fetch, no retries (the refresher owns scheduling)
// - A non-null `Error` in the envelope fails the fetch as `Error::Api`
// - IPv4 entries come before IPv6 entries, each in server order
// - The first unparseable address fails the whole fetch
//
// ## Security Requirements
//
// - The secret key NEVER appears in logs or Debug output
// - Credentials come from configuration only
//
// ## API Reference
//
// - DescribeOriginACL: https://www.tencentcloud.com/document/product/1145
// - Signature v3: https://www.tencentcloud.com/document/api/1145/50276

pub mod models;
pub mod signer;

use std::time::Duration;

use async_trait::async_trait;
use edgeone_core::prefix::parse_all;
use edgeone_core::traits::{PrefixSource, PrefixSourceFactory, SourceKind};
use edgeone_core::{Error, IpVersionFilter, Prefix, Result, SourceConfig, SourceRegistry};
use tracing::{debug, warn};

use crate::models::{DescribeOriginAclRequest, DescribeOriginAclResponse};
pub use crate::signer::Credentials;

/// TencentCloud TEO API endpoint
pub const TEO_API_ENDPOINT: &str = "https://teo.tencentcloudapi.com";

/// Action queried on every fetch
pub const DESCRIBE_ORIGIN_ACL: &str = "DescribeOriginACL";

/// Service identifier used in the credential scope
pub const TEO_SERVICE: &str = "teo";

/// Bound on establishing the TCP connection
///
/// The whole fetch is bounded by the configured timeout, not by the client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Origin ACL source for one EdgeOne zone
pub struct TeoOriginAclSource {
    credentials: Credentials,

    zone_id: String,

    /// Which address families to keep
    version: IpVersionFilter,

    endpoint: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the secret key
impl std::fmt::Debug for TeoOriginAclSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeoOriginAclSource")
            .field("credentials", &self.credentials)
            .field("zone_id", &self.zone_id)
            .field("version", &self.version)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl TeoOriginAclSource {
    /// Create a source against the production endpoint
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: empty zone id or credentials, or the HTTP
    ///   client could not be built
    pub fn new(
        credentials: Credentials,
        zone_id: impl Into<String>,
        version: IpVersionFilter,
    ) -> Result<Self> {
        let zone_id = zone_id.into();
        if zone_id.is_empty() {
            return Err(Error::config("TEO zone id is required"));
        }
        if credentials.secret_id().is_empty() {
            return Err(Error::config("TEO secret id is required"));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            zone_id,
            version,
            endpoint: TEO_API_ENDPOINT.to_string(),
            client,
        })
    }

    /// Point the source at a different endpoint (used by tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PrefixSource for TeoOriginAclSource {
    async fn fetch(&self) -> Result<Vec<Prefix>> {
        let payload = serde_json::to_string(&DescribeOriginAclRequest {
            zone_id: self.zone_id.clone(),
        })?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .body(payload.clone())
            .build()
            .map_err(|e| Error::http(format!("Invalid DescribeOriginACL request: {}", e)))?;
        signer::sign(
            &self.credentials,
            &mut request,
            DESCRIBE_ORIGIN_ACL,
            &payload,
            TEO_SERVICE,
        )?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::http(format!("DescribeOriginACL request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read DescribeOriginACL response: {}", e)))?;

        if !status.is_success() {
            // The API reports most failures inside the envelope; prefer that message
            if let Ok(envelope) = serde_json::from_str::<DescribeOriginAclResponse>(&body) {
                if let Some(error) = envelope.response.error {
                    return Err(Error::api(error.code, error.message));
                }
            }
            return Err(Error::http(format!("DescribeOriginACL returned HTTP {}", status)));
        }

        parse_origin_acl_response(&body, self.version)
    }

    fn source_name(&self) -> &'static str {
        "teo"
    }
}

/// Decode a DescribeOriginACL response body into prefixes
///
/// IPv4 addresses are kept unless `version` is v6-only, IPv6 addresses
/// unless it is v4-only.
pub fn parse_origin_acl_response(body: &str, version: IpVersionFilter) -> Result<Vec<Prefix>> {
    let envelope: DescribeOriginAclResponse = serde_json::from_str(body)?;
    let response = envelope.response;

    if let Some(error) = response.error {
        return Err(Error::api(error.code, error.message));
    }

    if let Some(request_id) = response.request_id.as_deref() {
        debug!("DescribeOriginACL RequestId={}", request_id);
    }

    let Some(addresses) = response.current_addresses() else {
        warn!("DescribeOriginACL response carries no current ACL, publishing an empty set");
        return Ok(Vec::new());
    };

    let mut prefixes = Vec::new();
    if version.includes_v4() {
        prefixes.extend(parse_all(addresses.ipv4())?);
    }
    if version.includes_v6() {
        prefixes.extend(parse_all(addresses.ipv6())?);
    }

    Ok(prefixes)
}

/// Factory for creating TEO origin ACL sources
pub struct TeoFactory;

impl PrefixSourceFactory for TeoFactory {
    fn create(&self, config: &SourceConfig) -> Result<Box<dyn PrefixSource>> {
        if !config.has_credentials() {
            return Err(Error::config(
                "TEO source requires zone_id, secret_id and secret_key",
            ));
        }

        let credentials = Credentials::new(config.secret_id.clone(), config.secret_key.clone());
        let source =
            TeoOriginAclSource::new(credentials, config.zone_id.clone(), config.version_filter()?)?;
        Ok(Box::new(source))
    }
}

/// Register the TEO source with a registry
pub fn register(registry: &SourceRegistry) {
    registry.register_source(SourceKind::Privileged, Box::new(TeoFactory));
}
