//! Network identity resolution against the bootstrap nodes.

use crate::client::NodeClient;
use cometbft_peers_rpc::{Endpoint, NetworkId, RpcError};
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;

/// Errors that prevent a crawl from starting.
#[derive(Debug)]
pub enum ResolveError {
    /// No bootstrap endpoints were given.
    NoSeeds,
    /// Every bootstrap endpoint failed in every attempt.
    Exhausted {
        /// Number of full passes made over the bootstrap endpoints.
        attempts: usize,
        /// Failure of the last endpoint queried.
        last: RpcError,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NoSeeds => write!(f, "No seed nodes provided"),
            ResolveError::Exhausted { attempts, last } => write!(
                f,
                "Unable to get network ID from any of the provided seed nodes after {attempts} attempts: {last}"
            ),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::NoSeeds => None,
            ResolveError::Exhausted { last, .. } => Some(last),
        }
    }
}

/// Determine the network the seeds belong to.
///
/// Seeds are tried in order and the first one answering wins, the remaining
/// seeds are not cross-checked. If all seeds fail, the whole list is retried
/// after `retry_delay`, up to `max_attempts` passes in total. At least one
/// pass is always made.
pub(crate) async fn resolve_network<C: NodeClient>(
    client: &C,
    seeds: &[Endpoint],
    max_attempts: usize,
    retry_delay: Duration,
) -> Result<NetworkId, ResolveError> {
    if seeds.is_empty() {
        return Err(ResolveError::NoSeeds);
    }

    let max_attempts = max_attempts.max(1);
    let mut last_error = None;
    for attempt in 1..=max_attempts {
        for seed in seeds {
            debug!("Attempt {attempt}: trying to get network ID from seed node {seed}");
            match client.status(seed).await {
                Ok(status) => {
                    let network = status.network();
                    info!("Seed node {seed} reports network {network}");
                    return Ok(network);
                }
                Err(e) => {
                    warn!("Failed to get network ID from seed node {seed}: {e}");
                    last_error = Some(e);
                }
            }
        }

        if attempt < max_attempts {
            info!("All seed nodes failed in attempt {attempt}, retrying in {retry_delay:?}");
            sleep(retry_delay).await;
        }
    }

    Err(match last_error {
        Some(last) => ResolveError::Exhausted {
            attempts: max_attempts,
            last,
        },
        None => ResolveError::NoSeeds,
    })
}
