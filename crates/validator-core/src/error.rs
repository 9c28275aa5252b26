//! Error types for an idea submission round trip.
//!
//! Every variant renders to the single display string shown next to the
//! form, so `Display` is the user-facing message.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Both title and description were empty after trimming.
    #[error("empty idea: write at least a title or a description")]
    EmptyIdea,

    /// A submission from this session is still waiting on the network.
    #[error("a submission is already in progress")]
    Busy,

    /// The proxy or provider answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body was not JSON.
    #[error("malformed response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, SubmitError>;
