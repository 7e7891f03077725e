mod address;
mod builder;
mod client;
mod crawler;
mod resolver;
mod session;

pub use address::{derive_endpoint, AddressError};
pub use builder::{CrawlerBuilder, CrawlerBuilderError};
pub use client::NodeClient;
pub use crawler::{Crawler, DiscoveredPeer};
pub use resolver::ResolveError;
pub use session::CrawlContext;

// Re-exports.
pub use cometbft_peers_rpc::{Endpoint, NetworkId, RpcClient, RpcError};
