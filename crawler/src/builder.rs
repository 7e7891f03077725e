//! Builder pattern for configuring and creating crawler instances.

use crate::client::NodeClient;
use crate::crawler::Crawler;
use cometbft_peers_rpc::{RpcClient, RpcError};
use std::fmt;
use std::time::Duration;

/// Default timeout for a single RPC request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default number of passes over the seeds when resolving the network.
const DEFAULT_MAX_ATTEMPTS: usize = 3;
/// Default pause between two resolution passes.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Errors that can occur during crawler configuration.
#[derive(Debug)]
pub enum CrawlerBuilderError {
    /// Request timeout must be greater than zero.
    ZeroTimeout,
    /// At least one resolution attempt is required.
    ZeroAttempts,
    /// The HTTP client could not be created.
    HttpClient(RpcError),
}

impl fmt::Display for CrawlerBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlerBuilderError::ZeroTimeout => write!(f, "Request timeout must be non-zero"),
            CrawlerBuilderError::ZeroAttempts => {
                write!(f, "Maximum resolution attempts must be at least 1")
            }
            CrawlerBuilderError::HttpClient(err) => {
                write!(f, "Unable to create HTTP client: {err}")
            }
        }
    }
}

impl std::error::Error for CrawlerBuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrawlerBuilderError::HttpClient(err) => Some(err),
            _ => None,
        }
    }
}

/// Builder for creating a customized [`Crawler`] instance.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), cometbft_peers_crawler::CrawlerBuilderError> {
/// use cometbft_peers_crawler::CrawlerBuilder;
/// use std::time::Duration;
///
/// // Create a crawler with default settings
/// let basic_crawler = CrawlerBuilder::new().build()?;
///
/// // Create a crawler with custom settings
/// let custom_crawler = CrawlerBuilder::new()
///     .with_request_timeout(Duration::from_secs(3))?
///     .with_max_attempts(5)?
///     .with_retry_delay(Duration::from_secs(2))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CrawlerBuilder {
    /// Timeout applied to each RPC request.
    request_timeout: Duration,
    /// Passes over the seeds while resolving the network.
    max_attempts: usize,
    /// Pause between resolution passes.
    retry_delay: Duration,
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlerBuilder {
    /// Create a new crawler builder with default settings.
    pub fn new() -> Self {
        CrawlerBuilder {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the timeout for each RPC request.
    ///
    /// The timeout applies per request, not per crawl. A node which does not
    /// answer in time is treated like an unreachable one.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Maximum time to wait for a response (defaults to 10 seconds).
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - The builder for method chaining.
    /// * `Err(CrawlerBuilderError)` - If the timeout is zero.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, CrawlerBuilderError> {
        if timeout.is_zero() {
            return Err(CrawlerBuilderError::ZeroTimeout);
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Set how many passes over the seeds are made while resolving the network.
    ///
    /// # Arguments
    ///
    /// * `attempts` - Number of passes (defaults to 3).
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - The builder for method chaining.
    /// * `Err(CrawlerBuilderError)` - If `attempts` is zero.
    pub fn with_max_attempts(mut self, attempts: usize) -> Result<Self, CrawlerBuilderError> {
        if attempts == 0 {
            return Err(CrawlerBuilderError::ZeroAttempts);
        }
        self.max_attempts = attempts;
        Ok(self)
    }

    /// Set the pause between two passes over the seeds.
    ///
    /// Seed nodes are sometimes briefly unavailable, e.g. while starting up or
    /// when rate limiting.
    ///
    /// # Arguments
    ///
    /// * `delay` - Pause between passes (defaults to 10 seconds).
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Build the crawler with the configured options.
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - A configured crawler querying nodes over HTTP.
    /// * `Err(CrawlerBuilderError)` - If the HTTP client could not be created.
    pub fn build(self) -> Result<Crawler, CrawlerBuilderError> {
        let client =
            RpcClient::new(self.request_timeout).map_err(CrawlerBuilderError::HttpClient)?;
        Ok(self.build_with_client(client))
    }

    /// Build the crawler around an existing client.
    ///
    /// The request timeout setting is ignored, it is the client's concern.
    pub fn build_with_client<C: NodeClient>(self, client: C) -> Crawler<C> {
        Crawler::new(client, self.max_attempts, self.retry_delay)
    }
}
