//! Wayfinder - Debounced, race-free place search
//!
//! Wayfinder turns a rapidly changing search box into two stable outputs: a
//! ranked list of place predictions and a single resolved place with
//! coordinates. It handles typing speed, latency variance and out-of-order
//! responses so the UI only ever renders the answer to the newest question.
//!
//! # Quick Start
//!
//! ```rust
//! use wayfinder::{SearchSession, SessionConfig};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // A session over the embedded Melbourne dataset
//! let session = SearchSession::new_embedded(SessionConfig::default())?;
//! let mut state = session.subscribe_state();
//!
//! // Feed every keystroke; only the final text is sent once typing pauses
//! for text in ["F", "Fl", "Fli", "Flin"] {
//!     session.on_query_changed(text)?;
//! }
//!
//! let state = state.wait_for(|s| !s.predictions.is_empty()).await.unwrap();
//! for prediction in &state.predictions {
//!     println!("{} ({:?})", prediction.full_text(), prediction.category());
//! }
//! # Ok::<(), wayfinder::error::WayfinderError>(())
//! # }).unwrap();
//! ```
//!
//! # Pipeline
//!
//! - **Debouncer**: commits a query after a quiet period (300 ms by default);
//!   blank input is committed at once so results clear without delay
//! - **Orchestrator**: owns the [`SearchState`] and the selected [`Place`],
//!   tagging every request with a [`RequestToken`] so stale responses are
//!   dropped no matter when they arrive
//! - **Provider**: any [`places::PlaceProvider`]; the session is given one at
//!   construction time
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod search;

pub use crate::core::SearchSession;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use search::{
    CommittedQuery, Debouncer, Phase, RequestToken, SearchOrchestrator, SearchState,
    SelectionSource,
};
pub use wayfinder_places as places;
pub use wayfinder_places::{LatLng, Place, PlaceCategory, Prediction};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Wayfinder library.
///
/// This sets up structured logging with configurable levels and filtering.
/// Call this once at the start of your application; later calls are no-ops.
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Examples
///
/// ```rust
/// use tracing::Level;
/// use wayfinder::init_logging;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), wayfinder::error::WayfinderError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::WayfinderError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?;

        // A global subscriber installed by the host app takes precedence.
        if let Err(err) = tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
        {
            tracing::debug!(error = %err, "Global subscriber already set, keeping it");
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        assert!(init_logging(tracing::Level::WARN).is_ok());
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_default_config_matches_builder() {
        assert_eq!(
            SessionConfig::default(),
            SessionConfigBuilder::new().build().unwrap()
        );
    }
}
