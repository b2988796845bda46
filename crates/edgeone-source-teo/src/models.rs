//! DescribeOriginACL wire models
//!
//! Field names follow the TencentCloud API exactly. Every field is optional
//! so that missing keys and JSON nulls both decode; only
//! `CurrentOriginACL.EntireAddresses` is consumed, the rest is kept for
//! format compatibility.

use serde::{Deserialize, Serialize};

/// Request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeOriginAclRequest {
    #[serde(rename = "ZoneId")]
    pub zone_id: String,
}

/// Top-level response envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeOriginAclResponse {
    #[serde(rename = "Response", default)]
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Present only when the call failed
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    #[serde(rename = "OriginACLInfo", default, skip_serializing_if = "Option::is_none")]
    pub origin_acl_info: Option<OriginAclInfo>,

    #[serde(rename = "RequestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Server-side error carried in the envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "Code", default)]
    pub code: String,

    #[serde(rename = "Message", default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginAclInfo {
    #[serde(rename = "L7Hosts", default)]
    pub l7_hosts: Option<Vec<String>>,

    #[serde(rename = "L4ProxyIds", default)]
    pub l4_proxy_ids: Option<Vec<String>>,

    #[serde(rename = "CurrentOriginACL", default)]
    pub current_origin_acl: Option<CurrentOriginAcl>,

    #[serde(rename = "NextOriginACL", default)]
    pub next_origin_acl: Option<NextOriginAcl>,

    /// `online`, `offline`, `updating`, ...
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
}

/// The ACL in effect right now
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentOriginAcl {
    #[serde(rename = "EntireAddresses", default)]
    pub entire_addresses: Option<Addresses>,

    #[serde(rename = "Version", default)]
    pub version: Option<String>,

    #[serde(rename = "ActiveTime", default)]
    pub active_time: Option<String>,

    #[serde(rename = "IsPlaned", default)]
    pub is_planed: Option<String>,
}

/// A scheduled ACL change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextOriginAcl {
    #[serde(rename = "Version", default)]
    pub version: Option<String>,

    #[serde(rename = "PlannedActiveTime", default)]
    pub planned_active_time: Option<String>,

    #[serde(rename = "EntireAddresses", default)]
    pub entire_addresses: Option<Addresses>,

    #[serde(rename = "AddedAddresses", default)]
    pub added_addresses: Option<Addresses>,

    #[serde(rename = "RemovedAddresses", default)]
    pub removed_addresses: Option<Addresses>,

    #[serde(rename = "NoChangeAddresses", default)]
    pub no_change_addresses: Option<Addresses>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addresses {
    #[serde(rename = "IPv4", default)]
    pub ipv4: Option<Vec<String>>,

    #[serde(rename = "IPv6", default)]
    pub ipv6: Option<Vec<String>>,
}

impl Addresses {
    pub fn ipv4(&self) -> &[String] {
        self.ipv4.as_deref().unwrap_or_default()
    }

    pub fn ipv6(&self) -> &[String] {
        self.ipv6.as_deref().unwrap_or_default()
    }
}

impl ResponseBody {
    /// `CurrentOriginACL.EntireAddresses`, if the server sent it
    pub fn current_addresses(&self) -> Option<&Addresses> {
        self.origin_acl_info
            .as_ref()?
            .current_origin_acl
            .as_ref()?
            .entire_addresses
            .as_ref()
    }
}
