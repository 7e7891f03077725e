//! Node RPC abstraction for testing and mocking.
//!
//! This module provides the [`NodeClient`] trait covering the two queries the
//! crawler needs, enabling dependency injection for testing without modifying
//! the traversal logic.

use cometbft_peers_rpc::{Endpoint, NetInfo, RpcClient, RpcError, Status};
use std::future::Future;

/// Queries a crawler issues against a node.
pub trait NodeClient: Send + Sync {
    /// Fetch the node's status, which carries its network identifier.
    fn status(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<Status, RpcError>> + Send;

    /// Fetch the peers the node is currently connected to.
    fn net_info(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<NetInfo, RpcError>> + Send;
}

impl NodeClient for RpcClient {
    fn status(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<Status, RpcError>> + Send {
        RpcClient::status(self, endpoint)
    }

    fn net_info(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<NetInfo, RpcError>> + Send {
        RpcClient::net_info(self, endpoint)
    }
}
