//! Internal session driving a single traversal of the peer graph.
//!
//! This module contains the [`CrawlSession`] which walks the graph depth first
//! from one start endpoint, and the [`CrawlContext`] holding the state shared
//! by every session of a crawl.

use crate::address::derive_endpoint;
use crate::client::NodeClient;
use crate::crawler::DiscoveredPeer;
use cometbft_peers_rpc::{Endpoint, NetworkId, PeerInfo};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::time::{Duration, Instant};

const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// State shared across all traversals of one crawl.
///
/// Sessions started from different seeds with the same context converge into
/// one deduplicated result.
#[derive(Debug, Default)]
pub struct CrawlContext {
    /// Endpoints already explored or queued for exploration.
    visited: HashSet<Endpoint>,
    /// Peers in the order they were first discovered.
    discovered: Vec<DiscoveredPeer>,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `endpoint` has been discovered as a peer.
    pub fn is_visited(&self, endpoint: &Endpoint) -> bool {
        self.visited.contains(endpoint)
    }

    /// Discovered peers, in discovery order.
    pub fn discovered(&self) -> &[DiscoveredPeer] {
        &self.discovered
    }

    pub fn into_discovered(self) -> Vec<DiscoveredPeer> {
        self.discovered
    }

    /// Mark `endpoint` visited and record the peer, unless it was seen before.
    ///
    /// # Returns
    ///
    /// `true` if the peer is new and should be explored.
    fn record(&mut self, endpoint: &Endpoint, peer: &PeerInfo) -> bool {
        if !self.visited.insert(endpoint.clone()) {
            return false;
        }
        self.discovered.push(DiscoveredPeer {
            ip: peer.remote_ip.clone(),
            moniker: peer.node_info.moniker.clone(),
            version: peer.node_info.version.clone(),
            endpoint: endpoint.clone(),
        });
        true
    }
}

/// Outcome of querying a single node.
#[derive(Debug)]
enum VisitResult {
    /// Node is on the crawled network and reported peers.
    FoundPeers(Vec<PeerInfo>),
    /// Node is on the crawled network but has no peers.
    NoPeersFound,
    /// Status query failed.
    Unreachable,
    /// Node reported a different network, its peers were not queried.
    NetworkMismatch,
    /// Peer list query failed.
    PeersUnavailable,
}

/// Depth first traversal from a single start endpoint.
///
/// Recursion is replaced by an explicit stack holding the remaining peers of
/// every node on the current path. A peer is marked visited before it is
/// explored, so each endpoint is explored at most once per context.
pub(crate) struct CrawlSession<'a, C> {
    client: &'a C,
    network: &'a NetworkId,
    context: &'a mut CrawlContext,
}

impl<'a, C: NodeClient> CrawlSession<'a, C> {
    pub fn new(client: &'a C, network: &'a NetworkId, context: &'a mut CrawlContext) -> Self {
        Self {
            client,
            network,
            context,
        }
    }

    /// Query one node and return its peers if it belongs to the crawled network.
    async fn visit(&self, endpoint: &Endpoint) -> VisitResult {
        debug!("Querying status of {endpoint}");
        let status = match self.client.status(endpoint).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Error querying status for {endpoint}: {e}");
                return VisitResult::Unreachable;
            }
        };

        let network = status.network();
        if &network != self.network {
            warn!(
                "Network mismatch for {endpoint}, expected {}, got {network}",
                self.network
            );
            return VisitResult::NetworkMismatch;
        }

        debug!("Querying net_info of {endpoint}");
        let peers = match self.client.net_info(endpoint).await {
            Ok(net_info) => net_info.peers,
            Err(e) => {
                warn!("Error querying net_info for {endpoint}: {e}");
                return VisitResult::PeersUnavailable;
            }
        };

        info!("Found {} peers for {endpoint}", peers.len());
        if peers.is_empty() {
            VisitResult::NoPeersFound
        } else {
            VisitResult::FoundPeers(peers)
        }
    }

    /// Explore everything reachable from `start`.
    ///
    /// `start` itself is always explored and is not marked visited.
    ///
    /// # Returns
    ///
    /// Number of newly discovered peers.
    pub async fn explore(&mut self, start: &Endpoint) -> usize {
        let before = self.context.discovered.len();
        let mut stack: Vec<std::vec::IntoIter<PeerInfo>> = Vec::new();

        match self.visit(start).await {
            VisitResult::FoundPeers(peers) => stack.push(peers.into_iter()),
            result => debug!("Visit of {start} finished: {result:?}"),
        }

        let mut last_log_time = Instant::now();

        loop {
            let next = match stack.last_mut() {
                Some(peers) => peers.next(),
                None => break,
            };
            let Some(peer) = next else {
                // All peers of the node on top handled, back to its parent.
                stack.pop();
                continue;
            };

            if last_log_time.elapsed() >= PROGRESS_LOG_INTERVAL {
                info!(
                    "{} peers discovered, {} endpoints visited, traversal depth {}",
                    self.context.discovered.len(),
                    self.context.visited.len(),
                    stack.len()
                );
                last_log_time = Instant::now();
            }

            let endpoint =
                match derive_endpoint(&peer.remote_ip, &peer.node_info.other.rpc_address) {
                    Ok(endpoint) => endpoint,
                    Err(e) => {
                        warn!("Skipping peer {}: {e}", peer.remote_ip);
                        continue;
                    }
                };
            debug!(
                "Constructed endpoint {endpoint} for peer {} ({})",
                peer.node_info.moniker, peer.node_info.version
            );

            if !self.context.record(&endpoint, &peer) {
                debug!("Peer already processed: {endpoint}");
                continue;
            }
            info!(
                "Adding new peer: {}, {}",
                peer.remote_ip, peer.node_info.moniker
            );

            match self.visit(&endpoint).await {
                VisitResult::FoundPeers(peers) => stack.push(peers.into_iter()),
                result => debug!("Visit of {endpoint} finished: {result:?}"),
            }
        }

        self.context.discovered.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_utils::{peer, Call, MockNodeClient};

    const NET: &str = "test-net";

    async fn explore(client: &MockNodeClient, start: &str, context: &mut CrawlContext) -> usize {
        let network = NetworkId::new(NET);
        CrawlSession::new(client, &network, context)
            .explore(&Endpoint::from(start))
            .await
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        // seed -> a, b; a -> c. Expected discovery order: a, c, b.
        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", NET);
        client.add_node("http://10.0.0.1:26657", NET);
        client.add_node("http://10.0.0.2:26657", NET);
        client.add_node("http://10.0.0.3:26657", NET);
        client.add_peer("http://seed:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "a"));
        client.add_peer("http://seed:26657", peer("10.0.0.2", "tcp://0.0.0.0:26657", "b"));
        client.add_peer("http://10.0.0.1:26657", peer("10.0.0.3", "tcp://0.0.0.0:26657", "c"));

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(found, 3);
        let monikers: Vec<&str> = context
            .discovered()
            .iter()
            .map(|p| p.moniker.as_str())
            .collect();
        assert_eq!(monikers, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_cycle_visits_each_once() {
        // a <-> b, starting from a seed pointing to a.
        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", NET);
        client.add_node("http://10.0.0.1:26657", NET);
        client.add_node("http://10.0.0.2:26657", NET);
        client.add_peer("http://seed:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "a"));
        client.add_peer("http://10.0.0.1:26657", peer("10.0.0.2", "tcp://0.0.0.0:26657", "b"));
        client.add_peer("http://10.0.0.2:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "a"));

        let mut context = CrawlContext::new();
        explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(context.discovered().len(), 2);
        assert_eq!(client.call_count("http://10.0.0.1:26657", Call::Status), 1);
        assert_eq!(client.call_count("http://10.0.0.2:26657", Call::Status), 1);
    }

    #[tokio::test]
    async fn test_self_loop() {
        let client = MockNodeClient::new();
        client.add_node("http://10.0.0.1:26657", NET);
        client.add_peer("http://10.0.0.1:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "me"));

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://10.0.0.1:26657", &mut context).await;

        // The start endpoint is recorded once when it reports itself, then explored once more.
        assert_eq!(found, 1);
        assert_eq!(client.call_count("http://10.0.0.1:26657", Call::Status), 2);
    }

    #[tokio::test]
    async fn test_network_mismatch_contributes_nothing() {
        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", "other-net");
        client.add_peer("http://seed:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "a"));
        client.add_peer("http://seed:26657", peer("10.0.0.2", "tcp://0.0.0.0:26657", "b"));

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(found, 0);
        assert_eq!(client.call_count("http://seed:26657", Call::NetInfo), 0);
    }

    #[tokio::test]
    async fn test_mismatched_peer_is_recorded_but_not_followed() {
        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", NET);
        client.add_node("http://10.0.0.1:26657", "other-net");
        client.add_peer("http://seed:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "relay"));
        client.add_peer("http://10.0.0.1:26657", peer("10.0.0.9", "tcp://0.0.0.0:26657", "foreign"));

        let mut context = CrawlContext::new();
        explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(context.discovered().len(), 1);
        assert_eq!(context.discovered()[0].moniker, "relay");
        assert_eq!(client.call_count("http://10.0.0.9:26657", Call::Status), 0);
    }

    #[tokio::test]
    async fn test_malformed_address_is_skipped() {
        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", NET);
        client.add_peer("http://seed:26657", peer("10.0.0.1", "0.0.0.0:26657", "broken"));
        client.add_peer("http://seed:26657", peer("10.0.0.2", "tcp://0.0.0.0:26657", "ok"));

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(found, 1);
        assert_eq!(context.discovered()[0].moniker, "ok");
        assert_eq!(
            context.discovered()[0].endpoint,
            Endpoint::from("http://10.0.0.2:26657")
        );
    }

    #[tokio::test]
    async fn test_incomplete_peer_entry_is_skipped() {
        let net_info: cometbft_peers_rpc::NetInfo = serde_json::from_value(serde_json::json!({
            "peers": [
                {
                    "node_info": {"moniker": "no-rpc", "version": "0.38.12", "other": {"rpc_address": null}},
                    "remote_ip": "10.0.0.1"
                },
                {
                    "node_info": {"moniker": "ok", "version": "0.38.12", "other": {"rpc_address": "tcp://0.0.0.0:26657"}},
                    "remote_ip": "10.0.0.2"
                }
            ]
        }))
        .unwrap();

        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", NET);
        for entry in net_info.peers {
            client.add_peer("http://seed:26657", entry);
        }

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(found, 1);
        assert_eq!(context.discovered()[0].moniker, "ok");
        assert!(!context.is_visited(&Endpoint::from("http://10.0.0.1:26657")));
    }

    #[tokio::test]
    async fn test_unreachable_start() {
        let client = MockNodeClient::new();
        let mut context = CrawlContext::new();
        let found = explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(found, 0);
        assert_eq!(client.call_count("http://seed:26657", Call::NetInfo), 0);
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_still_recorded() {
        let client = MockNodeClient::new();
        client.add_node("http://seed:26657", NET);
        client.add_peer("http://seed:26657", peer("10.0.0.1", "tcp://0.0.0.0:26657", "gone"));
        client.add_peer("http://seed:26657", peer("10.0.0.2", "tcp://0.0.0.0:26657", "here"));
        client.add_node("http://10.0.0.2:26657", NET);
        client.fail_net_info("http://10.0.0.2:26657");

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://seed:26657", &mut context).await;

        assert_eq!(found, 2);
        assert!(context.is_visited(&Endpoint::from("http://10.0.0.1:26657")));
        assert!(context.is_visited(&Endpoint::from("http://10.0.0.2:26657")));
    }

    #[tokio::test]
    async fn test_deep_chain() {
        // A long linear chain must not depend on call stack depth.
        let client = MockNodeClient::new();
        let depth = 5_000;
        let ip = |i: usize| format!("10.0.{}.{}", i / 256, i % 256);
        for i in 0..depth {
            let endpoint = format!("http://{}:26657", ip(i));
            client.add_node(&endpoint, NET);
            client.add_peer(&endpoint, peer(&ip(i + 1), "tcp://0.0.0.0:26657", "n"));
        }

        let mut context = CrawlContext::new();
        let found = explore(&client, "http://10.0.0.0:26657", &mut context).await;

        assert_eq!(found, depth);
    }
}
