use crate::client::NodeClient;
use crate::resolver::{resolve_network, ResolveError};
use crate::session::{CrawlContext, CrawlSession};
use cometbft_peers_rpc::{Endpoint, NetworkId, RpcClient};
use log::info;
use std::fmt;
use std::time::Duration;

/// A peer found during a crawl, as described by the neighbour that reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPeer {
    /// IP address the reporting neighbour observed the peer at.
    pub ip: String,
    /// Display name the peer advertises.
    pub moniker: String,
    /// Software version the peer advertises.
    pub version: String,
    /// RPC endpoint derived for the peer, its identity within a crawl.
    pub endpoint: Endpoint,
}

impl fmt::Display for DiscoveredPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ([peer] moniker: {}, version: {}, rpc: {})",
            self.ip, self.moniker, self.version, self.endpoint
        )
    }
}

/// A crawler for networks exposing CometBFT style node RPC.
///
/// The crawler first resolves the network identifier from the seeds, then
/// walks the peer graph from every seed, following each peer's RPC endpoint.
/// Nodes reporting a different network are not explored.
///
/// Use [`CrawlerBuilder`](crate::CrawlerBuilder) to create one.
#[derive(Debug, Clone)]
pub struct Crawler<C = RpcClient> {
    /// Client used for every node query.
    client: C,
    /// Passes over the seeds while resolving the network.
    max_attempts: usize,
    /// Pause between two resolution passes.
    retry_delay: Duration,
}

impl<C: NodeClient> Crawler<C> {
    pub(crate) fn new(client: C, max_attempts: usize, retry_delay: Duration) -> Self {
        Crawler {
            client,
            max_attempts,
            retry_delay,
        }
    }

    /// Determine the network identifier from the seed nodes.
    ///
    /// Seeds are queried in order, the first answer wins. If none answer, the
    /// whole list is retried after the configured delay.
    ///
    /// # Arguments
    ///
    /// * `seeds` - Bootstrap endpoints.
    ///
    /// # Returns
    ///
    /// * `Ok(NetworkId)` - Network reported by the first seed that answered.
    /// * `Err(ResolveError)` - If no seed answered in any attempt.
    pub async fn resolve_network(&self, seeds: &[Endpoint]) -> Result<NetworkId, ResolveError> {
        resolve_network(&self.client, seeds, self.max_attempts, self.retry_delay).await
    }

    /// Crawl the peer graph reachable from `start`.
    ///
    /// Failures of individual nodes are logged and skipped. Crawls sharing a
    /// `context` never explore or record the same endpoint twice.
    ///
    /// # Arguments
    ///
    /// * `network` - Network the explored nodes must report.
    /// * `start` - Endpoint to start from. It is always explored, but only
    ///   recorded if some node reports it as a peer.
    /// * `context` - Visited endpoints and discovered peers shared across crawls.
    ///
    /// # Returns
    ///
    /// Number of peers newly added to `context`.
    pub async fn crawl(
        &self,
        network: &NetworkId,
        start: &Endpoint,
        context: &mut CrawlContext,
    ) -> usize {
        info!("Crawling network {network} from {start}");
        let found = CrawlSession::new(&self.client, network, context)
            .explore(start)
            .await;
        info!("Crawl from {start} discovered {found} new peers");
        found
    }

    /// Crawl from every seed in order into one shared context.
    pub async fn crawl_seeds(&self, network: &NetworkId, seeds: &[Endpoint]) -> CrawlContext {
        let mut context = CrawlContext::new();
        for seed in seeds {
            self.crawl(network, seed, &mut context).await;
        }
        info!(
            "Crawler exhausted - {} unique peers discovered",
            context.discovered().len()
        );
        context
    }

    /// Resolve the network and crawl from every seed.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<DiscoveredPeer>)` - Every peer discovered, in discovery order.
    /// * `Err(ResolveError)` - If the network could not be resolved, no crawl is attempted.
    pub async fn run(&self, seeds: &[Endpoint]) -> Result<Vec<DiscoveredPeer>, ResolveError> {
        let network = self.resolve_network(seeds).await?;
        info!("Using network ID: {network}");
        Ok(self.crawl_seeds(&network, seeds).await.into_discovered())
    }
}
