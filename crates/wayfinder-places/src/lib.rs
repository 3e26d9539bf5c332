//! Place provider boundary for the Wayfinder search pipeline.
//!
//! This crate holds everything that crosses the line between the search
//! orchestrator and a place-search backend: the [`PlaceProvider`] trait, the
//! [`Prediction`] and [`Place`] models it returns, the request shapes it
//! receives, and two in-process providers:
//!
//! - [`FixtureProvider`] answers from an embedded dataset (demos, headless use)
//! - [`testing::ScriptedProvider`] parks every call until a test answers it
//!
//! Transport and authentication for a real backend live behind the trait and
//! are not part of this crate.

mod error;
mod fixture;
mod model;
mod provider;
mod request;
pub mod testing;

pub use error::{ProviderError, Result};
pub use fixture::FixtureProvider;
pub use model::{LatLng, Place, PlaceCategory, Prediction};
pub use provider::PlaceProvider;
pub use request::{DetailsRequest, PlaceField, PredictionRequest, ProviderConfig};
