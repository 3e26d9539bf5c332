use async_trait::async_trait;

use crate::{DetailsRequest, Place, Prediction, PredictionRequest, Result};

/// A place-search backend.
///
/// Both calls are single-shot and carry no ordering guarantee relative to each
/// other or to earlier calls. Latency is unbounded from the caller's point of
/// view, so callers that care about ordering must reconcile it themselves.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Candidate places for a non-blank text query, best match first.
    async fn find_predictions(&self, request: PredictionRequest) -> Result<Vec<Prediction>>;

    /// Resolve one place id. `Ok(None)` means the provider has no such place.
    async fn fetch_details(&self, request: DetailsRequest) -> Result<Option<Place>>;
}
