/// Errors raised by the orthant tree and its geometry primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrthantTreeError {
    /// The tree configuration was rejected at construction.
    #[error("invalid tree configuration: {0}")]
    InvalidConfiguration(String),
    /// A bounding volume with inverted or non-comparable corners.
    #[error("invalid bounding volume: {0}")]
    InvalidVolume(String),
    #[error("item not found")]
    ItemNotFound,
}
