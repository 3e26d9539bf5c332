use std::time::Duration;

use thiserror::Error;
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failures reported by a [`PlaceProvider`](crate::PlaceProvider).
///
/// A place that simply does not exist is not an error: `fetch_details`
/// returns `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Quota exceeded: {0}")]
    Quota(String),
    #[error("Authorization failed: {0}")]
    Auth(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Provider has been shut down")]
    Disconnected,
    #[error("Fixture data error: {0}")]
    Fixture(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProviderError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}
