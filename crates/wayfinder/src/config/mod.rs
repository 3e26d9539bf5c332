use std::time::Duration;

use wayfinder_places::{PlaceField, ProviderConfig};

use crate::error::WayfinderError;

const MAX_REGION_CODES: usize = 5;

/// Configuration for a search session.
///
/// Use [`SessionConfigBuilder`] to create one with validation.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use wayfinder::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .debounce(Duration::from_millis(200))
///     .region("nz")
///     .build()?;
/// assert_eq!(config.provider.region_codes, ["NZ"]);
/// # Ok::<(), wayfinder::error::WayfinderError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Quiet period before a typed query is committed
    pub debounce: Duration,
    /// Upper bound on a single provider call; `None` waits forever
    pub request_timeout: Option<Duration>,
    /// Abort the task of a superseded request (its result is discarded either way)
    pub cancel_superseded_requests: bool,
    /// Region filter and place fields sent with every request
    pub provider: ProviderConfig,
    /// Error shown when resolving a selected place fails
    pub details_error_message: String,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            request_timeout: Some(Duration::from_secs(10)),
            cancel_superseded_requests: true,
            provider: ProviderConfig::default(),
            details_error_message: "Failed to fetch details".to_string(),
        }
    }
}

/// Builder for creating session configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    /// Short debounce and timeout, for fast typists on good connections
    pub fn responsive() -> Self {
        Self::new()
            .debounce(Duration::from_millis(150))
            .request_timeout(Duration::from_secs(5))
    }

    /// Long debounce and timeout, for slow or metered connections
    pub fn patient() -> Self {
        Self::new()
            .debounce(Duration::from_millis(500))
            .request_timeout(Duration::from_secs(30))
    }

    /// Commit every edit as soon as it arrives
    pub fn immediate() -> Self {
        Self::new().debounce(Duration::ZERO)
    }

    pub fn debounce(mut self, quiet_period: Duration) -> Self {
        self.config.debounce = quiet_period;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Let provider calls run for as long as they take.
    pub fn without_timeout(mut self) -> Self {
        self.config.request_timeout = None;
        self
    }

    /// Restrict predictions to a single region (ISO 3166-1 alpha-2).
    pub fn region(mut self, code: impl Into<String>) -> Self {
        self.config.provider.region_codes = vec![code.into()];
        self
    }

    /// Restrict predictions to several regions.
    pub fn regions<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.provider.region_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Search without a region filter.
    pub fn worldwide(mut self) -> Self {
        self.config.provider.region_codes.clear();
        self
    }

    pub fn place_fields(mut self, fields: impl IntoIterator<Item = PlaceField>) -> Self {
        self.config.provider.place_fields = fields.into_iter().collect();
        self
    }

    pub fn cancel_superseded_requests(mut self, enabled: bool) -> Self {
        self.config.cancel_superseded_requests = enabled;
        self
    }

    pub fn details_error_message(mut self, message: impl Into<String>) -> Self {
        self.config.details_error_message = message.into();
        self
    }

    /// Validate and build the final configuration
    pub fn build(mut self) -> Result<SessionConfig, WayfinderError> {
        let regions = &mut self.config.provider.region_codes;
        if regions.len() > MAX_REGION_CODES {
            return Err(WayfinderError::ConfigError(format!(
                "At most {MAX_REGION_CODES} region codes are supported, got {}",
                regions.len()
            )));
        }
        for code in regions.iter_mut() {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(WayfinderError::ConfigError(format!(
                    "Region code must be two letters, got {code:?}"
                )));
            }
            code.make_ascii_uppercase();
        }

        if !self.config.provider.place_fields.contains(&PlaceField::Id) {
            return Err(WayfinderError::ConfigError(
                "Place fields must include the place id".to_string(),
            ));
        }
        if self.config.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(WayfinderError::ConfigError(
                "Request timeout must be non-zero; use without_timeout() to disable it"
                    .to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = SessionConfigBuilder::new().build().unwrap();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
        assert!(config.cancel_superseded_requests);
        assert_eq!(config.provider.region_codes, ["AU"]);
        assert_eq!(config.provider.place_fields, PlaceField::DEFAULT);
        assert_eq!(config.details_error_message, "Failed to fetch details");
    }

    #[test]
    fn test_presets() {
        let responsive = SessionConfigBuilder::responsive().build().unwrap();
        assert_eq!(responsive.debounce, Duration::from_millis(150));
        assert_eq!(responsive.request_timeout, Some(Duration::from_secs(5)));

        let patient = SessionConfigBuilder::patient().build().unwrap();
        assert_eq!(patient.debounce, Duration::from_millis(500));
        assert_eq!(patient.request_timeout, Some(Duration::from_secs(30)));

        let immediate = SessionConfigBuilder::immediate().build().unwrap();
        assert!(immediate.debounce.is_zero());
    }

    #[test]
    fn test_override_presets() {
        let config = SessionConfigBuilder::patient()
            .debounce(Duration::from_millis(50))
            .without_timeout()
            .build()
            .unwrap();
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_region_codes_are_normalised() {
        let config = SessionConfigBuilder::new()
            .regions(["au", "Nz"])
            .build()
            .unwrap();
        assert_eq!(config.provider.region_codes, ["AU", "NZ"]);

        let worldwide = SessionConfigBuilder::new().worldwide().build().unwrap();
        assert!(worldwide.provider.region_codes.is_empty());
    }

    #[test]
    fn test_region_validation() {
        assert!(SessionConfigBuilder::new().region("AUS").build().is_err());
        assert!(SessionConfigBuilder::new().region("A1").build().is_err());
        assert!(
            SessionConfigBuilder::new()
                .regions(["AU", "NZ", "US", "GB", "FR", "DE"])
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_place_fields_must_include_id() {
        let result = SessionConfigBuilder::new()
            .place_fields([PlaceField::DisplayName, PlaceField::Location])
            .build();
        assert!(matches!(result, Err(WayfinderError::ConfigError(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = SessionConfigBuilder::new()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
