//! Error types for the sample panels.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UiError {
    /// The confirm dialog was opened without a question.
    #[error("confirm dialog needs a message")]
    EmptyMessage,

    /// The node was destroyed before the panel could bind to it.
    #[error("node {0} is gone")]
    NodeGone(u64),
}
