//! Derivation of a peer's queryable RPC endpoint.
//!
//! Nodes advertise their RPC listen address as they configured it, which is
//! usually a wildcard like `tcp://0.0.0.0:26657`. Only the port is trusted, the
//! host is replaced by the IP the reporting neighbour observed the peer at.

use cometbft_peers_rpc::Endpoint;
use std::fmt;
use std::net::Ipv6Addr;

/// Minimum number of colon separated segments in a usable advertised RPC address.
const MIN_RPC_ADDRESS_SEGMENTS: usize = 3;

/// Errors that can occur while deriving a peer endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The advertised RPC address has too few colon separated segments.
    Malformed(String),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::Malformed(address) => {
                write!(f, "Unexpected RPC address format: {address}")
            }
        }
    }
}

impl std::error::Error for AddressError {}

/// Build the endpoint a peer's RPC interface is reachable at.
///
/// # Arguments
///
/// * `remote_ip` - IP address the reporting node observed the peer at.
/// * `rpc_address` - RPC address advertised by the peer, e.g. `tcp://0.0.0.0:26657`.
///
/// # Returns
///
/// * `Ok(Endpoint)` - `http://{remote_ip}:{port}` where port is the last segment of `rpc_address`.
/// * `Err(AddressError)` - If `rpc_address` has fewer than three colon separated segments.
///
/// IPv6 remote IPs are wrapped in brackets, e.g. `http://[2001:db8::1]:26657`.
///
/// # Example
///
/// ```
/// use cometbft_peers_crawler::derive_endpoint;
///
/// let endpoint = derive_endpoint("203.0.113.5", "tcp://0.0.0.0:26657").unwrap();
/// assert_eq!(endpoint.as_str(), "http://203.0.113.5:26657");
///
/// assert!(derive_endpoint("203.0.113.5", "0.0.0.0:26657").is_err());
/// ```
pub fn derive_endpoint(remote_ip: &str, rpc_address: &str) -> Result<Endpoint, AddressError> {
    let segments: Vec<&str> = rpc_address.split(':').collect();
    if segments.len() < MIN_RPC_ADDRESS_SEGMENTS {
        return Err(AddressError::Malformed(rpc_address.to_string()));
    }
    let port = segments[segments.len() - 1];

    // IPv6 literals need brackets to be a valid authority.
    let host = match remote_ip.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{remote_ip}]"),
        Err(_) => remote_ip.to_string(),
    };

    Ok(Endpoint::new(format!("http://{host}:{port}")))
}
