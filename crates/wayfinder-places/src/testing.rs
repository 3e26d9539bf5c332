//! A hand-driven provider for tests.
//!
//! Every call made to a [`ScriptedProvider`] is parked until the test answers
//! it through the paired [`ScriptedHandle`]. Answering calls out of order is
//! how tests reproduce a slow early response overtaking a fast later one.
//!
//! ```rust
//! use wayfinder_places::{PlaceProvider, Prediction, ProviderConfig, testing::ScriptedProvider};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (provider, mut handle) = ScriptedProvider::new();
//! let call = tokio::spawn(async move {
//!     provider
//!         .find_predictions(ProviderConfig::default().prediction_request("Flin"))
//!         .await
//! });
//!
//! let pending = handle.next_predictions().await.unwrap();
//! assert_eq!(pending.query(), "Flin");
//! pending.respond(vec![Prediction::new("p1", "Flinders Street Station")]);
//!
//! assert_eq!(call.await.unwrap().unwrap().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::{
    DetailsRequest, Place, PlaceProvider, Prediction, PredictionRequest, ProviderError, Result,
};

/// A parked `find_predictions` call.
#[derive(Debug)]
pub struct PendingPredictions {
    pub request: PredictionRequest,
    responder: oneshot::Sender<Result<Vec<Prediction>>>,
}

impl PendingPredictions {
    pub fn query(&self) -> &str {
        &self.request.query
    }

    /// True once the caller stopped waiting, e.g. because its task was aborted.
    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }

    pub fn respond(self, predictions: Vec<Prediction>) {
        // The caller may have been aborted already; nothing to deliver then.
        let _ = self.responder.send(Ok(predictions));
    }

    pub fn fail(self, error: ProviderError) {
        let _ = self.responder.send(Err(error));
    }
}

/// A parked `fetch_details` call.
#[derive(Debug)]
pub struct PendingDetails {
    pub request: DetailsRequest,
    responder: oneshot::Sender<Result<Option<Place>>>,
}

impl PendingDetails {
    pub fn place_id(&self) -> &str {
        &self.request.place_id
    }

    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }

    pub fn respond(self, place: Option<Place>) {
        let _ = self.responder.send(Ok(place));
    }

    pub fn fail(self, error: ProviderError) {
        let _ = self.responder.send(Err(error));
    }
}

/// Provider half: hand this to the code under test.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    predictions: mpsc::UnboundedSender<PendingPredictions>,
    details: mpsc::UnboundedSender<PendingDetails>,
}

/// Test half: receives parked calls in the order they were made.
#[derive(Debug)]
pub struct ScriptedHandle {
    predictions: mpsc::UnboundedReceiver<PendingPredictions>,
    details: mpsc::UnboundedReceiver<PendingDetails>,
}

impl ScriptedProvider {
    pub fn new() -> (Self, ScriptedHandle) {
        let (predictions_tx, predictions_rx) = mpsc::unbounded_channel();
        let (details_tx, details_rx) = mpsc::unbounded_channel();
        (
            Self {
                predictions: predictions_tx,
                details: details_tx,
            },
            ScriptedHandle {
                predictions: predictions_rx,
                details: details_rx,
            },
        )
    }
}

impl ScriptedHandle {
    /// Wait for the next `find_predictions` call.
    pub async fn next_predictions(&mut self) -> Option<PendingPredictions> {
        self.predictions.recv().await
    }

    /// Wait for the next `fetch_details` call.
    pub async fn next_details(&mut self) -> Option<PendingDetails> {
        self.details.recv().await
    }

    /// A `find_predictions` call that has already been made, if any.
    pub fn try_next_predictions(&mut self) -> Option<PendingPredictions> {
        self.predictions.try_recv().ok()
    }

    /// A `fetch_details` call that has already been made, if any.
    pub fn try_next_details(&mut self) -> Option<PendingDetails> {
        self.details.try_recv().ok()
    }
}

#[async_trait]
impl PlaceProvider for ScriptedProvider {
    async fn find_predictions(&self, request: PredictionRequest) -> Result<Vec<Prediction>> {
        debug!(query = %request.query, "Scripted predictions call parked");
        let (responder, response) = oneshot::channel();
        self.predictions
            .send(PendingPredictions { request, responder })
            .map_err(|_| ProviderError::Disconnected)?;
        response.await.map_err(|_| ProviderError::Disconnected)?
    }

    async fn fetch_details(&self, request: DetailsRequest) -> Result<Option<Place>> {
        debug!(place_id = %request.place_id, "Scripted details call parked");
        let (responder, response) = oneshot::channel();
        self.details
            .send(PendingDetails { request, responder })
            .map_err(|_| ProviderError::Disconnected)?;
        response.await.map_err(|_| ProviderError::Disconnected)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderConfig;

    #[tokio::test]
    async fn test_responses_can_be_delivered_out_of_order() {
        let (provider, mut handle) = ScriptedProvider::new();
        let config = ProviderConfig::default();

        let first = tokio::spawn({
            let provider = provider.clone();
            let request = config.prediction_request("Flin");
            async move { provider.find_predictions(request).await }
        });
        let first_call = handle.next_predictions().await.unwrap();

        let second = tokio::spawn({
            let provider = provider.clone();
            let request = config.prediction_request("Flinders");
            async move { provider.find_predictions(request).await }
        });
        let second_call = handle.next_predictions().await.unwrap();

        second_call.respond(vec![Prediction::new("p2", "Flinders Street Station")]);
        let second_result = second.await.unwrap().unwrap();
        assert_eq!(second_result[0].place_id, "p2");

        first_call.fail(ProviderError::Quota("over limit".into()));
        assert!(matches!(
            first.await.unwrap(),
            Err(ProviderError::Quota(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_responder_reports_disconnected() {
        let (provider, mut handle) = ScriptedProvider::new();
        let call = tokio::spawn({
            let provider = provider.clone();
            async move {
                provider
                    .fetch_details(ProviderConfig::default().details_request("p1"))
                    .await
            }
        });

        let pending = handle.next_details().await.unwrap();
        assert_eq!(pending.place_id(), "p1");
        drop(pending);

        assert!(matches!(
            call.await.unwrap(),
            Err(ProviderError::Disconnected)
        ));
        assert!(handle.try_next_details().is_none());
    }

    #[tokio::test]
    async fn test_aborted_caller_is_seen_as_abandoned() {
        let (provider, mut handle) = ScriptedProvider::new();
        let call = tokio::spawn(async move {
            provider
                .find_predictions(ProviderConfig::default().prediction_request("Flin"))
                .await
        });

        let pending = handle.next_predictions().await.unwrap();
        assert!(!pending.is_abandoned());

        call.abort();
        assert!(call.await.unwrap_err().is_cancelled());
        assert!(pending.is_abandoned());
    }
}
