//! Request shapes sent to a provider.
//!
//! The region filter and the requested field list are static configuration
//! ([`ProviderConfig`]); they ride along with every request but never change
//! how the caller branches on the response.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fields requested when resolving a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceField {
    Id,
    DisplayName,
    FormattedAddress,
    Location,
    Types,
}

impl PlaceField {
    /// The field set needed to show a place on the map and in the details sheet.
    pub const DEFAULT: [Self; 5] = [
        Self::Id,
        Self::DisplayName,
        Self::FormattedAddress,
        Self::Location,
        Self::Types,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::DisplayName => "displayName",
            Self::FormattedAddress => "formattedAddress",
            Self::Location => "location",
            Self::Types => "types",
        }
    }
}

impl fmt::Display for PlaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static request configuration shared by every call a session makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// ISO 3166-1 alpha-2 codes predictions are restricted to; empty means worldwide
    pub region_codes: Vec<String>,
    /// Fields requested by `fetch_details`
    pub place_fields: Vec<PlaceField>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region_codes: vec!["AU".to_string()],
            place_fields: PlaceField::DEFAULT.to_vec(),
        }
    }
}

impl ProviderConfig {
    pub fn prediction_request(&self, query: impl Into<String>) -> PredictionRequest {
        PredictionRequest {
            query: query.into(),
            region_codes: self.region_codes.clone(),
        }
    }

    pub fn details_request(&self, place_id: impl Into<String>) -> DetailsRequest {
        DetailsRequest {
            place_id: place_id.into(),
            fields: self.place_fields.clone(),
        }
    }
}

/// "Find predictions for text".
///
/// The query is never blank: callers clear their results locally instead of
/// asking the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub query: String,
    pub region_codes: Vec<String>,
}

impl PredictionRequest {
    /// Whether `region` passes this request's region filter.
    pub fn allows_region(&self, region: &str) -> bool {
        self.region_codes.is_empty()
            || self
                .region_codes
                .iter()
                .any(|code| code.eq_ignore_ascii_case(region))
    }
}

/// "Fetch details for place id".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsRequest {
    pub place_id: String,
    pub fields: Vec<PlaceField>,
}

impl DetailsRequest {
    pub fn wants(&self, field: PlaceField) -> bool {
        self.fields.contains(&field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_restricts_to_australia() {
        let config = ProviderConfig::default();
        let request = config.prediction_request("Flin");

        assert_eq!(request.query, "Flin");
        assert!(request.allows_region("AU"));
        assert!(request.allows_region("au"));
        assert!(!request.allows_region("NZ"));
    }

    #[test]
    fn test_empty_region_filter_allows_everything() {
        let config = ProviderConfig {
            region_codes: Vec::new(),
            ..ProviderConfig::default()
        };
        assert!(config.prediction_request("x").allows_region("NZ"));
    }

    #[test]
    fn test_details_request_carries_default_fields() {
        let request = ProviderConfig::default().details_request("p1");
        assert_eq!(request.place_id, "p1");
        for field in PlaceField::DEFAULT {
            assert!(request.wants(field), "missing {field}");
        }
    }
}
