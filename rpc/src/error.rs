//! Error types for node RPC requests.

use reqwest::StatusCode;
use std::error::Error;
use std::fmt;

/// Errors that can occur while querying a node's RPC interface.
///
/// All of these are local to a single node. Callers decide whether to retry,
/// this crate never does.
#[derive(Debug)]
pub enum RpcError {
    /// The request could not be sent, timed out, or the body could not be read.
    Transport(reqwest::Error),
    /// The node answered with a non-success HTTP status.
    HttpStatus(StatusCode),
    /// The response body was not the expected JSON document.
    Decode(serde_json::Error),
    /// The node answered with a JSON-RPC error object.
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Human readable error message, including any extra data the node attached.
        message: String,
    },
    /// The JSON-RPC envelope carried neither a result nor an error.
    MissingResult,
}

impl RpcError {
    /// Returns `true` if the request ran into the configured timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            RpcError::Transport(err) => err.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if the node answered, but with something that could not be understood.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            RpcError::Decode(_) | RpcError::Rpc { .. } | RpcError::MissingResult
        )
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport(err) => write!(f, "RPC transport error: {err}"),
            RpcError::HttpStatus(status) => write!(f, "RPC request failed with HTTP {status}"),
            RpcError::Decode(err) => write!(f, "Unable to decode RPC response: {err}"),
            RpcError::Rpc { code, message } => {
                write!(f, "Node returned RPC error {code}: {message}")
            }
            RpcError::MissingResult => write!(f, "RPC response carried no result"),
        }
    }
}

impl Error for RpcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RpcError::Transport(err) => Some(err),
            RpcError::Decode(err) => Some(err),
            RpcError::HttpStatus(_) => None,
            RpcError::Rpc { .. } => None,
            RpcError::MissingResult => None,
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        RpcError::Transport(err)
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Decode(err)
    }
}
