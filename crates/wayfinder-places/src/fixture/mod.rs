//! In-memory provider over a small embedded dataset of Melbourne transit places.
//!
//! Useful for demos and headless runs where no real place-search backend is
//! available. Matching is deliberately simple: case-insensitive name prefix
//! first, then every query word as a prefix of some name word, then plain
//! substring.

use std::time::Duration;

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{
    DetailsRequest, Place, PlaceField, PlaceProvider, Prediction, PredictionRequest,
    ProviderError, Result,
};

const EMBEDDED_MELBOURNE: &str = include_str!("melbourne.json");
const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone, Deserialize)]
struct FixtureRecord {
    region: String,
    place: Place,
}

/// A [`PlaceProvider`] answering from memory.
///
/// # Examples
///
/// ```rust
/// use wayfinder_places::{FixtureProvider, PlaceProvider, ProviderConfig};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let provider = FixtureProvider::embedded()?;
/// let request = ProviderConfig::default().prediction_request("Flinders Street");
/// let predictions = provider.find_predictions(request).await?;
/// assert_eq!(predictions[0].primary_text, "Flinders Street Station");
/// # Ok::<(), wayfinder_places::ProviderError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    records: Vec<FixtureRecord>,
    by_id: HashMap<String, usize>,
    limit: usize,
    latency: Duration,
    failure: Option<String>,
}

impl FixtureProvider {
    /// Load the dataset compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_MELBOURNE)
    }

    /// Load a dataset of `{"region": "AU", "place": {...}}` records.
    #[instrument(name = "Load fixture places", skip_all, level = "debug")]
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<FixtureRecord> = serde_json::from_str(json)?;
        info!(places = records.len(), "Loaded fixture places");
        Ok(Self::from_records(records))
    }

    /// Build a provider from places that all belong to one region.
    pub fn from_places(region: &str, places: impl IntoIterator<Item = Place>) -> Self {
        Self::from_records(
            places
                .into_iter()
                .map(|place| FixtureRecord {
                    region: region.to_string(),
                    place,
                })
                .collect(),
        )
    }

    fn from_records(records: Vec<FixtureRecord>) -> Self {
        let by_id = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.place.id.clone(), i))
            .collect();
        Self {
            records,
            by_id,
            limit: DEFAULT_LIMIT,
            latency: Duration::ZERO,
            failure: None,
        }
    }

    /// Maximum number of predictions returned per query.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every request with a transport error carrying `message`.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    async fn simulate_round_trip(&self) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match &self.failure {
            Some(message) => Err(ProviderError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

/// Lower is better; `None` means no match.
fn match_rank(name: &str, query: &str) -> Option<u8> {
    let name = name.to_lowercase();
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    if name.starts_with(&query) {
        return Some(0);
    }

    let words = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect_vec();
    if query
        .split_whitespace()
        .all(|token| words.iter().any(|w| w.starts_with(token)))
    {
        Some(1)
    } else if name.contains(&query) {
        Some(2)
    } else {
        None
    }
}

#[async_trait]
impl PlaceProvider for FixtureProvider {
    async fn find_predictions(&self, request: PredictionRequest) -> Result<Vec<Prediction>> {
        self.simulate_round_trip().await?;

        let predictions = self
            .records
            .iter()
            .filter(|record| request.allows_region(&record.region))
            .filter_map(|record| {
                match_rank(&record.place.display_name, &request.query).map(|rank| (rank, record))
            })
            .sorted_by(|(a_rank, a), (b_rank, b)| {
                a_rank
                    .cmp(b_rank)
                    .then_with(|| a.place.display_name.cmp(&b.place.display_name))
            })
            .take(self.limit)
            .map(|(_, record)| {
                let place = &record.place;
                Prediction {
                    place_id: place.id.clone(),
                    primary_text: place.display_name.clone(),
                    secondary_text: place.formatted_address.clone(),
                    types: place.types.clone(),
                }
            })
            .collect_vec();

        debug!(query = %request.query, found = predictions.len(), "Fixture predictions");
        Ok(predictions)
    }

    async fn fetch_details(&self, request: DetailsRequest) -> Result<Option<Place>> {
        self.simulate_round_trip().await?;

        let Some(&index) = self.by_id.get(&request.place_id) else {
            debug!(place_id = %request.place_id, "Fixture place not found");
            return Ok(None);
        };
        let mut place = self.records[index].place.clone();
        if !request.wants(PlaceField::FormattedAddress) {
            place.formatted_address = None;
        }
        if !request.wants(PlaceField::Types) {
            place.types.clear();
        }
        Ok(Some(place))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LatLng, PlaceCategory, ProviderConfig};

    fn provider() -> FixtureProvider {
        FixtureProvider::embedded().expect("embedded fixture should parse")
    }

    #[test]
    fn test_embedded_dataset_loads() {
        let provider = provider();
        assert!(!provider.is_empty());
        assert!(provider.records.iter().all(|r| r.place.location.is_valid()));
    }

    #[test]
    fn test_match_rank_ordering() {
        assert_eq!(match_rank("Flinders Street Station", "flin"), Some(0));
        assert_eq!(match_rank("Flinders Street Station", "Flinders St"), Some(0));
        assert_eq!(match_rank("Flinders Street Station", "street flin"), Some(1));
        assert_eq!(match_rank("Flinders St/Elizabeth St", "st/eliz"), Some(2));
        assert_eq!(match_rank("Flinders Street Station", "richmond"), None);
        assert_eq!(match_rank("Flinders Street Station", "   "), None);
    }

    #[tokio::test]
    async fn test_predictions_ranked_and_limited() {
        let provider = provider().with_limit(2);
        let request = ProviderConfig::default().prediction_request("Flin");

        let predictions = provider.find_predictions(request).await.unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].primary_text, "Flinders St/Elizabeth St");
        assert_eq!(predictions[1].primary_text, "Flinders Street Station");
        assert_eq!(predictions[1].category(), PlaceCategory::TrainStation);
    }

    #[tokio::test]
    async fn test_region_filter_applies() {
        let provider = provider();
        let config = ProviderConfig::default();

        let au_only = provider
            .find_predictions(config.prediction_request("Britomart"))
            .await
            .unwrap();
        assert!(au_only.is_empty());

        let nz = ProviderConfig {
            region_codes: vec!["NZ".to_string()],
            ..config
        };
        let found = provider
            .find_predictions(nz.prediction_request("Britomart"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_details_lookup_and_field_mask() {
        let provider = provider();
        let config = ProviderConfig::default();

        let place = provider
            .fetch_details(config.details_request("mel-flinders-street-station"))
            .await
            .unwrap()
            .expect("known id");
        assert_eq!(place.location, LatLng::new(-37.8183, 144.9671));
        assert!(place.formatted_address.is_some());

        let narrow = ProviderConfig {
            place_fields: vec![PlaceField::Id, PlaceField::Location],
            ..ProviderConfig::default()
        };
        let masked = provider
            .fetch_details(narrow.details_request("mel-flinders-street-station"))
            .await
            .unwrap()
            .expect("known id");
        assert!(masked.formatted_address.is_none());
        assert!(masked.types.is_empty());

        let missing = provider
            .fetch_details(config.details_request("does-not-exist"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_failing_provider_reports_transport_error() {
        let provider = provider().failing("offline");
        let err = provider
            .find_predictions(ProviderConfig::default().prediction_request("Flin"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(ref m) if m == "offline"));
        assert!(err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let provider = provider().with_latency(Duration::from_millis(250));
        let start = tokio::time::Instant::now();
        provider
            .find_predictions(ProviderConfig::default().prediction_request("Flin"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
