//! Error types shared by every layer of the crate.

use thiserror::Error;

/// Errors raised while wiring or driving the interaction layer.
#[derive(Error, Debug)]
pub enum Error {
  /// No element with this id is registered in the document.
  #[error("no element with id `{id}` in the document")]
  ElementNotFound { id: String },

  /// The element was removed from its document, or the document is gone.
  #[error("element `{id}` is not attached to a document")]
  Detached { id: String },

  /// A screen matrix with a zero determinant cannot be inverted.
  #[error("screen transform is not invertible")]
  SingularTransform,

  /// A mutator passed to `MutableModel::try_apply` failed; nothing was
  /// committed.
  #[error("model mutation failed: {0}")]
  Mutation(String),

  /// Settings could not be parsed.
  #[error("invalid settings: {0}")]
  Config(#[from] serde_json::Error),
}

/// Result type alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
