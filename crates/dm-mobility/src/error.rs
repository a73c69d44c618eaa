use dm_core::{DeviceId, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("device {0} is at node {1}, which is not in the network")]
    UnknownNode(DeviceId, NodeId),

    #[error("node {0} has no adjacency entries (not even itself)")]
    EmptyAdjacency(NodeId),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
