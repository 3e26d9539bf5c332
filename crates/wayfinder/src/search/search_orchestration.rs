//! The search state machine.
//!
//! The orchestrator consumes committed queries and selection events, issues
//! provider requests, and owns the observable [`SearchState`] and selected
//! [`Place`]. Responses can arrive in any order and after any delay; each
//! request carries a [`RequestToken`] and a response is applied only while its
//! token is still the latest minted for its class. Aborting the superseded
//! task is an optimisation on top of that check, never a replacement for it.
//!
//! Every transition runs under one mutex, so no two completions interleave
//! their read-modify-write of the state.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{runtime::Handle, sync::watch, task::AbortHandle};
use tracing::{debug, info, instrument, warn};
use wayfinder_places::{Place, PlaceProvider, Prediction, ProviderError};

use super::state::{CommittedQuery, Phase, RequestToken, SearchState, TokenSequence};
use crate::{config::SessionConfig, error::Result};

/// How a place id reached the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionSource {
    /// The user tapped a row in the prediction list
    Prediction,
    /// The user tapped a point of interest on the map
    PointOfInterest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestClass {
    Predictions,
    Details,
}

#[derive(Debug, Default)]
struct Machine {
    phase: Phase,
    predictions: TokenSequence,
    details: TokenSequence,
    predictions_task: Option<AbortHandle>,
    details_task: Option<AbortHandle>,
    closed: bool,
}

impl Machine {
    /// Abort every request task still running, whatever the supersede policy.
    fn abort_tasks(&mut self) {
        let tasks = self.predictions_task.take().into_iter().chain(self.details_task.take());
        for task in tasks {
            task.abort();
        }
    }
}

struct Inner {
    provider: Arc<dyn PlaceProvider>,
    config: SessionConfig,
    runtime: Handle,
    machine: Mutex<Machine>,
    state: watch::Sender<SearchState>,
    selected: watch::Sender<Option<Place>>,
}

/// Owns the search state and the selected-place slot.
///
/// Cloning yields another handle to the same machine. Must be created inside
/// a Tokio runtime; requests are spawned onto that runtime.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use wayfinder::{CommittedQuery, SearchOrchestrator, SessionConfig};
/// use wayfinder::places::FixtureProvider;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let provider = Arc::new(FixtureProvider::embedded()?);
/// let orchestrator = SearchOrchestrator::new(provider, SessionConfig::default())?;
///
/// let mut state = orchestrator.subscribe_state();
/// orchestrator.on_committed_query(CommittedQuery::new("Richmond"));
/// state.wait_for(|s| !s.is_loading).await.unwrap();
///
/// assert_eq!(orchestrator.state().predictions[0].primary_text, "Richmond Station");
/// # Ok::<(), wayfinder::error::WayfinderError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn PlaceProvider>, config: SessionConfig) -> Result<Self> {
        let runtime = Handle::try_current()?;
        let (state, _) = watch::channel(SearchState::default());
        let (selected, _) = watch::channel(None);
        Ok(Self {
            inner: Arc::new(Inner {
                provider,
                config,
                runtime,
                machine: Mutex::new(Machine::default()),
                state,
                selected,
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn selected_place(&self) -> Option<Place> {
        self.inner.selected.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_selected_place(&self) -> watch::Receiver<Option<Place>> {
        self.inner.selected.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().closed
    }

    /// Start a predictions search, or clear results for a blank query.
    #[instrument(name = "Committed query", level = "debug", skip_all, fields(query = %query))]
    pub fn on_committed_query(&self, query: CommittedQuery) {
        let inner = &self.inner;
        let mut machine = inner.lock();
        if machine.closed {
            debug!("Ignoring query after shutdown");
            return;
        }

        // Typing again abandons any place resolution still in flight.
        inner.invalidate(&mut machine, RequestClass::Details);
        inner.invalidate(&mut machine, RequestClass::Predictions);

        if query.is_blank() {
            machine.phase = if inner.selected.borrow().is_some() {
                Phase::Selected
            } else {
                Phase::Idle
            };
            inner.state.send_replace(SearchState::default());
            debug!("Blank query, results cleared");
            return;
        }

        let token = machine.predictions.mint();
        machine.phase = Phase::Searching;
        inner.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
        info!(%token, "Searching for predictions");

        let request = inner.config.provider.prediction_request(query.into_inner());
        let provider = Arc::clone(&inner.provider);
        let timeout = inner.config.request_timeout;
        let weak = Arc::downgrade(inner);
        let task = inner.runtime.spawn(async move {
            let result = bounded(timeout, provider.find_predictions(request)).await;
            if let Some(inner) = weak.upgrade() {
                inner.apply_predictions(token, result);
            }
        });
        machine.predictions_task = Some(task.abort_handle());
    }

    /// The user tapped a prediction row.
    pub fn on_prediction_selected(&self, prediction_id: impl Into<String>) {
        self.select_place(prediction_id.into(), SelectionSource::Prediction);
    }

    /// The user tapped a point of interest on the map.
    pub fn on_point_of_interest_selected(&self, place_id: impl Into<String>) {
        self.select_place(place_id.into(), SelectionSource::PointOfInterest);
    }

    /// Resolve `place_id`, pre-empting any predictions search in flight.
    #[instrument(name = "Select place", level = "debug", skip(self))]
    pub fn select_place(&self, place_id: String, source: SelectionSource) {
        let inner = &self.inner;
        let mut machine = inner.lock();
        if machine.closed {
            debug!("Ignoring selection after shutdown");
            return;
        }

        inner.invalidate(&mut machine, RequestClass::Predictions);
        inner.invalidate(&mut machine, RequestClass::Details);
        let token = machine.details.mint();
        machine.phase = Phase::DetailsLoading;
        inner.state.send_modify(|state| state.is_loading = true);
        info!(%token, ?source, %place_id, "Fetching place details");

        let request = inner.config.provider.details_request(place_id);
        let provider = Arc::clone(&inner.provider);
        let timeout = inner.config.request_timeout;
        let weak = Arc::downgrade(inner);
        let task = inner.runtime.spawn(async move {
            let result = bounded(timeout, provider.fetch_details(request)).await;
            if let Some(inner) = weak.upgrade() {
                inner.apply_details(token, result);
            }
        });
        machine.details_task = Some(task.abort_handle());
    }

    /// Dismiss the selected place. Does not start a search.
    #[instrument(name = "Clear selection", level = "debug", skip(self))]
    pub fn clear_selection(&self) {
        let inner = &self.inner;
        let mut machine = inner.lock();
        if machine.closed {
            return;
        }

        // A details response still in flight must not resurrect the selection.
        inner.invalidate(&mut machine, RequestClass::Details);
        inner.selected.send_replace(None);

        match machine.phase {
            Phase::DetailsLoading => {
                inner.state.send_modify(|state| state.is_loading = false);
                machine.phase = Phase::settled(&inner.state.borrow());
            }
            Phase::Selected => machine.phase = Phase::settled(&inner.state.borrow()),
            _ => {}
        }
    }

    /// Stop accepting events. Responses that resolve afterwards are dropped.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        let mut machine = inner.lock();
        if machine.closed {
            return;
        }
        machine.closed = true;
        machine.abort_tasks();
        inner.invalidate(&mut machine, RequestClass::Predictions);
        inner.invalidate(&mut machine, RequestClass::Details);
        info!("Search orchestrator shut down");
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the class's outstanding response stale and, if configured, abort its task.
    fn invalidate(&self, machine: &mut Machine, class: RequestClass) {
        let (tokens, task) = match class {
            RequestClass::Predictions => (&mut machine.predictions, &mut machine.predictions_task),
            RequestClass::Details => (&mut machine.details, &mut machine.details_task),
        };
        tokens.invalidate();
        if let Some(task) = task.take() {
            if self.config.cancel_superseded_requests {
                task.abort();
            }
        }
    }

    fn accepts(machine: &Machine, class: RequestClass, token: RequestToken) -> bool {
        let current = match class {
            RequestClass::Predictions => machine.predictions.is_current(token),
            RequestClass::Details => machine.details.is_current(token),
        };
        if machine.closed || !current {
            debug!(?class, %token, "Discarding stale response");
            return false;
        }
        true
    }

    fn apply_predictions(
        &self,
        token: RequestToken,
        result: wayfinder_places::Result<Vec<Prediction>>,
    ) {
        let mut machine = self.lock();
        if !Self::accepts(&machine, RequestClass::Predictions, token) {
            return;
        }
        machine.predictions_task = None;

        match result {
            Ok(predictions) => {
                debug!(%token, count = predictions.len(), "Predictions received");
                machine.phase = Phase::Results;
                self.state.send_replace(SearchState::with_predictions(predictions));
            }
            Err(err) => {
                warn!(%token, error = %err, "Predictions request failed");
                machine.phase = Phase::Error;
                self.state.send_replace(SearchState::failed(err.to_string()));
            }
        }
    }

    fn apply_details(
        &self,
        token: RequestToken,
        result: wayfinder_places::Result<Option<Place>>,
    ) {
        let mut machine = self.lock();
        if !Self::accepts(&machine, RequestClass::Details, token) {
            return;
        }
        machine.details_task = None;

        match result {
            Ok(Some(place)) => {
                info!(%token, place = %place, "Place resolved");
                machine.phase = Phase::Selected;
                self.selected.send_replace(Some(place));
                self.state.send_replace(SearchState::default());
            }
            Ok(None) => {
                warn!(%token, "Place not found");
                self.details_failed(&mut machine);
            }
            Err(err) => {
                warn!(%token, error = %err, "Details request failed");
                self.details_failed(&mut machine);
            }
        }
    }

    /// Keep any earlier selection; surface the failure in the list state.
    fn details_failed(&self, machine: &mut Machine) {
        machine.phase = Phase::Error;
        let message = self.config.details_error_message.clone();
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(message);
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.machine
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .abort_tasks();
    }
}

/// Run a provider call under the configured timeout.
async fn bounded<T>(
    timeout: Option<Duration>,
    call: impl Future<Output = wayfinder_places::Result<T>>,
) -> wayfinder_places::Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(ProviderError::Timeout(limit))),
        None => call.await,
    }
}
