use thiserror::Error;

/// Failures while relaying a request to the provider. All of them become a
/// 500 with the error's message.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned a non-JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}
