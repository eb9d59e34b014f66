//! Parsing of the address strings the orchestrator hands out.

use ipnet::IpNet;
use std::net::IpAddr;

/// Why an address string could not be turned into a host address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("'{0}' is missing a prefix length")]
    MissingPrefix(String),
    #[error("'{0}' is not a valid ip address")]
    InvalidHost(String),
    #[error("'{address}' is not a valid cidr")]
    InvalidCidr {
        address: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}

/// Extract the host portion of a CIDR formatted address, e.g. `10.0.1.2/24`.
///
/// The prefix length is mandatory and must fit the address family.
/// IPv4-mapped IPv6 hosts come back as plain IPv4.
pub fn host_of_cidr(cidr: &str) -> Result<IpAddr, AddressError> {
    if !cidr.contains('/') {
        return Err(AddressError::MissingPrefix(cidr.to_string()));
    }

    cidr.parse::<IpNet>()
        .map(|net| canonical(net.addr()))
        .map_err(|source| AddressError::InvalidCidr {
            address: cidr.to_string(),
            source,
        })
}

/// Parse a virtual address, which the engine reports either bare or in CIDR form.
pub fn parse_virtual_address(address: &str) -> Result<IpAddr, AddressError> {
    if address.contains('/') {
        host_of_cidr(address)
    } else {
        address
            .parse()
            .map(canonical)
            .map_err(|_| AddressError::InvalidHost(address.to_string()))
    }
}

fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        IpAddr::V4(_) => ip,
    }
}
