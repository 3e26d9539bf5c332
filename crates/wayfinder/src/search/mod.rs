//! Search pipeline internals.
//!
//! Raw keystrokes pass through the [`Debouncer`], which commits a query once
//! typing pauses. The [`SearchOrchestrator`] turns committed queries and
//! selection events into provider requests and keeps only the newest
//! response of each kind.

mod debounce;
mod search_orchestration;
mod state;

pub use debounce::Debouncer;
pub use search_orchestration::{SearchOrchestrator, SelectionSource};
pub use state::{CommittedQuery, Phase, RequestToken, SearchState};
