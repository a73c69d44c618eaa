//! Top-level simulation error, composing the errors of every crate a `Sim`
//! touches during `build()`/`run()`.

use dm_network::NetworkError;
use dm_output::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

pub type SimResult<T> = Result<T, SimError>;
