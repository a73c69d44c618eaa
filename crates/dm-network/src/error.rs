//! Network-subsystem error type.

use thiserror::Error;

use dm_core::NodeId;

/// Errors produced by `dm-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("no population-weighted samples available for node {0}")]
    NoSamples(NodeId),

    #[error("no places remained after bounding-box and name filtering")]
    EmptyNodeSet,

    #[error("cache error: {0}")]
    Cache(#[from] dm_cache::CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
