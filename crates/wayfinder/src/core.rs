//! The UI-facing search session.
//!
//! [`SearchSession`] wires a [`Debouncer`] in front of a
//! [`SearchOrchestrator`] and exposes the narrow interface a screen needs:
//! four inbound events and two observable values.
//!
//! # Quick Start
//!
//! ```rust
//! use wayfinder::{SearchSession, SessionConfigBuilder};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let session = SearchSession::new_embedded(SessionConfigBuilder::immediate().build()?)?;
//! let mut state = session.subscribe_state();
//!
//! session.on_query_changed("Flagstaff")?;
//! let state = state
//!     .wait_for(|s| !s.predictions.is_empty())
//!     .await
//!     .unwrap()
//!     .clone();
//! let first = &state.predictions[0];
//!
//! let mut selected = session.subscribe_selected_place();
//! session.on_prediction_selected(first.place_id.clone())?;
//! let place = selected.wait_for(Option::is_some).await.unwrap().clone();
//! println!("Resolved: {}", place.unwrap());
//! # Ok::<(), wayfinder::error::WayfinderError>(())
//! # }).unwrap();
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, instrument};
use wayfinder_places::{FixtureProvider, Place, PlaceProvider};

use crate::{
    config::SessionConfig,
    error::{Result, WayfinderError},
    search::{Debouncer, Phase, SearchOrchestrator, SearchState},
};

/// One search screen's worth of state.
///
/// Must be created inside a Tokio runtime. Dropping the session tears it
/// down: no further state changes happen afterwards.
pub struct SearchSession {
    debouncer: Debouncer,
    orchestrator: SearchOrchestrator,
    forwarder: JoinHandle<()>,
    closed: AtomicBool,
}

impl SearchSession {
    /// Create a session over `provider`.
    ///
    /// The provider is a capability handed in by the caller; the session never
    /// looks one up on its own.
    #[instrument(name = "Create SearchSession", level = "info", skip(provider))]
    pub fn new(provider: Arc<dyn PlaceProvider>, config: SessionConfig) -> Result<Self> {
        let orchestrator = SearchOrchestrator::new(provider, config)?;
        let (debouncer, mut committed) = Debouncer::spawn(orchestrator.config().debounce)?;

        let forwarder = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move {
                while let Some(query) = committed.recv().await {
                    orchestrator.on_committed_query(query);
                }
            }
        });

        info!("Search session ready");
        Ok(Self {
            debouncer,
            orchestrator,
            forwarder,
            closed: AtomicBool::new(false),
        })
    }

    /// Create a session over the embedded fixture dataset.
    pub fn new_embedded(config: SessionConfig) -> Result<Self> {
        let provider = FixtureProvider::embedded()?;
        Self::new(Arc::new(provider), config)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(WayfinderError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Feed the latest contents of the search box.
    pub fn on_query_changed(&self, text: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        if self.debouncer.submit(text) {
            Ok(())
        } else {
            Err(WayfinderError::SessionClosed)
        }
    }

    pub fn on_prediction_selected(&self, prediction_id: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.orchestrator.on_prediction_selected(prediction_id);
        Ok(())
    }

    pub fn on_point_of_interest_selected(&self, place_id: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.orchestrator.on_point_of_interest_selected(place_id);
        Ok(())
    }

    pub fn clear_selection(&self) -> Result<()> {
        self.ensure_open()?;
        self.orchestrator.clear_selection();
        Ok(())
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SearchState> {
        self.orchestrator.subscribe_state()
    }

    pub fn subscribe_selected_place(&self) -> watch::Receiver<Option<Place>> {
        self.orchestrator.subscribe_selected_place()
    }

    pub fn state(&self) -> SearchState {
        self.orchestrator.state()
    }

    pub fn selected_place(&self) -> Option<Place> {
        self.orchestrator.selected_place()
    }

    pub fn phase(&self) -> Phase {
        self.orchestrator.phase()
    }

    pub fn config(&self) -> &SessionConfig {
        self.orchestrator.config()
    }

    /// Direct access to the state machine, bypassing the debouncer.
    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Tear the session down. Idempotent.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.debouncer.shutdown();
        self.forwarder.abort();
        self.orchestrator.shutdown();
        info!("Search session closed");
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
