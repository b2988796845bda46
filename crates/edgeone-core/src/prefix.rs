// # Prefix
//
// An immutable CIDR range: base address plus prefix length. The address
// family is implied by the address form.
//
// Parsing accepts either a CIDR expression (`10.0.0.0/8`, `2001:db8::/32`)
// or a bare address, which becomes a host prefix (/32 or /128). Host bits
// are kept exactly as written.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;

use crate::error::{Error, Result};

/// A CIDR-notation address range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(IpNet);

impl Prefix {
    /// Parse a CIDR expression or a bare IP address
    pub fn parse_cidr_expression(expr: &str) -> Result<Self> {
        if expr.contains('/') {
            return expr
                .parse::<IpNet>()
                .map(Self)
                .map_err(|e| Error::parse(expr, e));
        }

        expr.parse::<IpAddr>()
            .map(|addr| Self(IpNet::from(addr)))
            .map_err(|e| Error::parse(expr, e))
    }

    /// Base address as written
    pub fn addr(&self) -> IpAddr {
        self.0.addr()
    }

    /// Prefix length in bits
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.0, IpNet::V4(_))
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self.0, IpNet::V6(_))
    }

    /// Whether `ip` falls inside this range
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }

    /// The underlying `ipnet` value
    pub fn as_ipnet(&self) -> &IpNet {
        &self.0
    }
}

impl From<IpNet> for Prefix {
    fn from(net: IpNet) -> Self {
        Self(net)
    }
}

impl FromStr for Prefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_cidr_expression(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Parse every expression, failing on the first one that is malformed.
///
/// No partial result is ever returned.
pub fn parse_all<I, S>(exprs: I) -> Result<Vec<Prefix>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    exprs
        .into_iter()
        .map(|expr| Prefix::parse_cidr_expression(expr.as_ref()))
        .collect()
}
