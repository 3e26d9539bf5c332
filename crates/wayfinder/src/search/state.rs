use std::fmt;

use wayfinder_places::Prediction;

/// What the UI renders for the prediction list.
///
/// Replaced wholesale on every transition; two request completions never
/// edit the same value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    /// Current result set, best match first
    pub predictions: Vec<Prediction>,
    /// A predictions or details request is in flight
    pub is_loading: bool,
    /// Message for the inline error row
    pub error: Option<String>,
}

impl SearchState {
    pub(crate) fn with_predictions(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions,
            is_loading: false,
            error: None,
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            predictions: Vec::new(),
            is_loading: false,
            error: Some(message.into()),
        }
    }

    /// No predictions, not loading, no error.
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty() && !self.is_loading && self.error.is_none()
    }
}

/// Where the orchestrator's state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No query, no results
    #[default]
    Idle,
    /// Predictions request in flight; earlier predictions may still be shown
    Searching,
    /// Predictions available
    Results,
    /// The last request failed
    Error,
    /// Place-details request in flight
    DetailsLoading,
    /// A place is resolved and the prediction list is closed
    Selected,
}

impl Phase {
    /// The resting phase for a state with nothing in flight.
    pub(crate) fn settled(state: &SearchState) -> Self {
        if state.error.is_some() {
            Self::Error
        } else if state.predictions.is_empty() {
            Self::Idle
        } else {
            Self::Results
        }
    }
}

/// A debounced query, ready to trigger a provider lookup.
///
/// Blank input is normalised to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommittedQuery(String);

impl CommittedQuery {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self(String::new())
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CommittedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one issued request within its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-class token counter. A response may be applied only if its token is
/// still the latest one minted for its class.
#[derive(Debug, Default)]
pub(crate) struct TokenSequence {
    latest: u64,
}

impl TokenSequence {
    pub(crate) fn mint(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// Make every outstanding token stale without issuing a new request.
    pub(crate) fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub(crate) fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_token_supersedes_older() {
        let mut tokens = TokenSequence::default();
        let first = tokens.mint();
        let second = tokens.mint();

        assert!(second > first);
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));
    }

    #[test]
    fn test_invalidate_makes_latest_stale() {
        let mut tokens = TokenSequence::default();
        let token = tokens.mint();
        tokens.invalidate();
        assert!(!tokens.is_current(token));

        let next = tokens.mint();
        assert!(tokens.is_current(next));
        assert_eq!(next.sequence(), 3);
    }

    #[test]
    fn test_committed_query_normalises_blank() {
        assert!(CommittedQuery::new("   \t").is_blank());
        assert_eq!(CommittedQuery::new("   ").as_str(), "");
        assert_eq!(CommittedQuery::new(" Flin ").as_str(), " Flin ");
        assert!(!CommittedQuery::new("Flin").is_blank());
    }

    #[test]
    fn test_settled_phase() {
        assert_eq!(Phase::settled(&SearchState::default()), Phase::Idle);
        assert_eq!(
            Phase::settled(&SearchState::with_predictions(vec![Prediction::new("p1", "A")])),
            Phase::Results
        );
        assert_eq!(Phase::settled(&SearchState::failed("boom")), Phase::Error);
        assert!(SearchState::default().is_empty());
    }
}
