//! Framework error type.
//!
//! Sub-crates define their own error enums and convert them into `DmError`
//! via `From` impls, or keep them separate and wrap `DmError` as one variant.

use thiserror::Error;

use crate::{DeviceId, NodeId};

/// The top-level error type for `dm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DmError {
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `dm-*` crates.
pub type DmResult<T> = Result<T, DmError>;
