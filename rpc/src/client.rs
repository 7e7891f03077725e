//! HTTP client for a node's JSON-RPC interface.
//!
//! # Examples
//!
//! Fetching the peers of a single node.
//!
//! ```no_run
//! use cometbft_peers_rpc::{Endpoint, RpcClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RpcClient::new(Duration::from_secs(5))?;
//! let node = Endpoint::from("http://127.0.0.1:26657");
//!
//! let status = client.status(&node).await?;
//! println!("Node is on network {}", status.network());
//!
//! for peer in client.net_info(&node).await?.peers {
//!     println!("{} {}", peer.remote_ip, peer.node_info.moniker);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::RpcError;
use crate::types::{Endpoint, NetInfo, RpcResponse, Status};
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Path of the node status endpoint.
pub const STATUS_PATH: &str = "/status";
/// Path of the connected peers endpoint.
pub const NET_INFO_PATH: &str = "/net_info";

/// Client issuing single, non-retried GET requests against node RPC endpoints.
///
/// Cheap to clone, clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl RpcClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Upper bound for each individual request, from connect to the last body byte.
    ///
    /// # Returns
    ///
    /// * `Ok(RpcClient)` - The configured client.
    /// * `Err(RpcError)` - If the HTTP backend could not be initialized.
    pub fn new(timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(RpcClient { http, timeout })
    }

    /// The per request timeout this client was built with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a GET for `path` on `endpoint` and return the raw response body.
    ///
    /// Non-success HTTP statuses are reported as [`RpcError::HttpStatus`].
    pub async fn fetch(&self, endpoint: &Endpoint, path: &str) -> Result<Vec<u8>, RpcError> {
        let url = endpoint.url(path);
        debug!("GET {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("GET {url} returned {status}");
            return Err(RpcError::HttpStatus(status));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Query the node's status, which carries its network identifier.
    pub async fn status(&self, endpoint: &Endpoint) -> Result<Status, RpcError> {
        self.call(endpoint, STATUS_PATH).await
    }

    /// Query the node's currently connected peers.
    pub async fn net_info(&self, endpoint: &Endpoint) -> Result<NetInfo, RpcError> {
        self.call(endpoint, NET_INFO_PATH).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        path: &str,
    ) -> Result<T, RpcError> {
        let body = self.fetch(endpoint, path).await?;
        decode(&body)
    }
}

/// Unwrap a JSON-RPC envelope into its result.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RpcError> {
    let response: RpcResponse<T> = serde_json::from_slice(body)?;
    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.describe(),
        });
    }
    response.result.ok_or(RpcError::MissingResult)
}
