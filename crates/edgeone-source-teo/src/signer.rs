//! TC3-HMAC-SHA256 request signing
//!
//! Signs an outgoing TencentCloud API request in place. The only
//! non-deterministic input is the timestamp; [`sign_at`] takes it
//! explicitly so signatures can be checked against known answers.
//!
//! ```text
//! canonical request = METHOD \n PATH \n QUERY \n
//!                     content-type:<ct>\nhost:<host>\n \n
//!                     content-type;host \n sha256hex(payload)
//! string to sign    = TC3-HMAC-SHA256 \n <ts> \n <date>/<service>/tc3_request \n
//!                     sha256hex(canonical request)
//! signing key       = HMAC(HMAC(HMAC("TC3" + key, date), service), "tc3_request")
//! ```

use std::fmt;

use chrono::DateTime;
use edgeone_core::{Error, Result};
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST, HeaderValue};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "TC3-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host";
const REQUEST_SUFFIX: &str = "tc3_request";

/// Content type sent and signed on every request
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// API version for the TEO service
pub const API_VERSION: &str = "2022-09-01";

/// TencentCloud API key pair
#[derive(Clone)]
pub struct Credentials {
    secret_id: String,
    /// ⚠️ NEVER log this value
    secret_key: String,
}

// Custom Debug implementation that hides the secret key
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

impl Credentials {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }
}

/// Sign `request` using the current wall-clock time
pub fn sign(
    credentials: &Credentials,
    request: &mut reqwest::Request,
    action: &str,
    payload: &str,
    service: &str,
) -> Result<()> {
    sign_at(
        credentials,
        request,
        action,
        payload,
        service,
        chrono::Utc::now().timestamp(),
    )
}

/// Sign `request` as of `timestamp` (Unix seconds)
///
/// Writes `Authorization`, `Content-Type`, `Host`, `X-TC-Action`,
/// `X-TC-Timestamp` and `X-TC-Version`. Nothing else is touched.
pub fn sign_at(
    credentials: &Credentials,
    request: &mut reqwest::Request,
    action: &str,
    payload: &str,
    service: &str,
    timestamp: i64,
) -> Result<()> {
    let host = host_header(request.url())?;
    let canonical = canonical_request(
        request.method().as_str(),
        request.url().path(),
        request.url().query().unwrap_or(""),
        &host,
        payload,
    );
    let authorization = authorization(credentials, service, &canonical, timestamp)?;

    let headers = request.headers_mut();
    headers.insert(AUTHORIZATION, header_value(&authorization)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.insert(HOST, header_value(&host)?);
    headers.insert("X-TC-Action", header_value(action)?);
    headers.insert("X-TC-Timestamp", HeaderValue::from(timestamp));
    headers.insert("X-TC-Version", HeaderValue::from_static(API_VERSION));

    Ok(())
}

/// The `Authorization` header value for a canonical request
pub fn authorization(
    credentials: &Credentials,
    service: &str,
    canonical_request: &str,
    timestamp: i64,
) -> Result<String> {
    let date = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| Error::signing(format!("timestamp out of range: {}", timestamp)))?
        .format("%Y-%m-%d")
        .to_string();
    let scope = format!("{}/{}/{}", date, service, REQUEST_SUFFIX);

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        timestamp,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let secret_date = hmac_sha256(format!("TC3{}", credentials.secret_key).as_bytes(), &date)?;
    let secret_service = hmac_sha256(&secret_date, service)?;
    let signing_key = hmac_sha256(&secret_service, REQUEST_SUFFIX)?;
    let signature = hex::encode(hmac_sha256(&signing_key, &string_to_sign)?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.secret_id, scope, SIGNED_HEADERS, signature
    ))
}

fn canonical_request(method: &str, path: &str, query: &str, host: &str, payload: &str) -> String {
    format!(
        "{}\n{}\n{}\ncontent-type:{}\nhost:{}\n\n{}\n{}",
        method,
        path,
        query,
        CONTENT_TYPE_JSON,
        host,
        SIGNED_HEADERS,
        sha256_hex(payload.as_bytes())
    )
}

/// Host as it appears on the wire, with the port only when explicit
fn host_header(url: &reqwest::Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::signing(format!("request URL has no host: {}", url)))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::signing(format!("invalid header value: {}", e)))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], message: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| Error::signing(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
