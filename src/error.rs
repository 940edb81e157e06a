//! Error kinds surfaced by the listing pipeline.
//!
//! Library operations return [`Result`], which carries a [`HomeMatchError`].
//! The CLI wraps these in `anyhow` with additional context.

use thiserror::Error;

/// Errors raised by model calls, collection operations, and retrieval.
#[derive(Error, Debug)]
pub enum HomeMatchError {
    /// The language model could not be called or returned an error.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// The model answered, but the answer is not a valid listing.
    #[error("could not parse model response: {reason}")]
    ResponseParse { reason: String, response: String },

    /// The collection rejected an operation (duplicate id, I/O, embedding).
    #[error("store operation failed: {0}")]
    StoreOperation(String),

    /// A retrieval that needed at least one hit returned none.
    #[error("no listings matched query: {query:?}")]
    EmptyResult { query: String },

    /// The collection returned parallel arrays that do not line up.
    #[error("malformed query result: {0}")]
    MalformedQueryResult(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, HomeMatchError>;
