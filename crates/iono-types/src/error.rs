use thiserror::Error;

#[derive(Error, Debug)]
pub enum IonoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Mesh topology broken: {0}")]
    TopologyBroken(String),

    #[error("Adjacency capacity exceeded at node {node}: {what} limit is {limit}")]
    CapacityExceeded {
        node: usize,
        what: &'static str,
        limit: usize,
    },

    #[error("{what} index out of bounds: {index} >= {len}")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type IonoResult<T> = Result<T, IonoError>;
