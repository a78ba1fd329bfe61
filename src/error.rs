//! Error types for verkle_trie

use thiserror::Error;

/// Result type alias for verkle_trie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in verkle_trie operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Node not found at location {0}")]
    NodeNotFound(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Missing commitment for dirty node at location {0}")]
    MissingCommitment(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
