use thiserror::Error;

#[derive(Error, Debug)]
pub enum WayfinderError {
    #[error("Provider error: {0}")]
    Provider(#[from] wayfinder_places::ProviderError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Search session has been shut down")]
    SessionClosed,
    #[error("No Tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WayfinderError>;
