mod client;
mod error;
mod types;

pub use client::{RpcClient, NET_INFO_PATH, STATUS_PATH};
pub use error::RpcError;
pub use types::{
    Endpoint, NetInfo, NetworkId, PeerInfo, PeerNodeInfo, PeerNodeInfoOther, Status,
    StatusNodeInfo,
};

// Re-exports.
pub use reqwest::StatusCode;
