//! Node identity and the JSON-RPC documents served by `/status` and `/net_info`.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Base URL of a node's RPC interface, e.g. `http://203.0.113.5:26657`.
///
/// Two endpoints address the same node if and only if their string forms are
/// equal. No normalization of equivalent host representations is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from its base URL.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Endpoint(url.into())
    }

    /// The base URL as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full request URL for `path`, appended verbatim to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(url: &str) -> Self {
        Endpoint::new(url)
    }
}

impl From<String> for Endpoint {
    fn from(url: String) -> Self {
        Endpoint(url)
    }
}

/// Identifier of a network instance, the chain id reported in `node_info.network`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        NetworkId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON-RPC 2.0 envelope wrapping every response.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

impl RpcErrorObject {
    /// Message with the node supplied detail appended, if any.
    pub fn describe(&self) -> String {
        match self.data.as_deref() {
            Some(data) if !data.is_empty() => format!("{} ({data})", self.message),
            _ => self.message.clone(),
        }
    }
}

/// Result of `GET /status`.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub node_info: StatusNodeInfo,
}

/// The node's description of itself.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusNodeInfo {
    /// Network (chain id) the node participates in.
    pub network: String,
}

impl Status {
    pub fn network(&self) -> NetworkId {
        NetworkId::new(self.node_info.network.clone())
    }
}

/// Result of `GET /net_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetInfo {
    /// Currently connected peers, in the order the node reports them.
    #[serde(deserialize_with = "null_as_default")]
    pub peers: Vec<PeerInfo>,
}

/// A connected peer as observed by the reporting node.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerInfo {
    pub node_info: PeerNodeInfo,
    /// IP address the reporting node sees the peer connecting from.
    pub remote_ip: String,
}

/// The peer's self description, relayed by the reporting node.
///
/// Missing or `null` fields decode as empty, so one incomplete entry does not
/// spoil the rest of the peer list.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerNodeInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub moniker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub other: PeerNodeInfoOther,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerNodeInfoOther {
    /// Advertised RPC listen address, usually with a placeholder host like `tcp://0.0.0.0:26657`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rpc_address: String,
}

// CometBFT has been known to serialize empty values, e.g. an empty peer list, as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
