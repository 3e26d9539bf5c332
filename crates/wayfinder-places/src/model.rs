//! Place data returned by a provider.
//!
//! A [`Prediction`] is a cheap text-search candidate; a [`Place`] is the fully
//! resolved entity fetched for one prediction. Both are immutable values and
//! are replaced wholesale rather than edited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad category of a place, derived from its provider type tags.
///
/// The UI uses this to choose an icon for a prediction row.
///
/// # Examples
///
/// ```rust
/// use wayfinder_places::PlaceCategory;
///
/// let category = PlaceCategory::from_types(["transit_station", "train_station"]);
/// assert_eq!(category, PlaceCategory::TrainStation);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaceCategory {
    /// Heavy-rail station
    TrainStation,
    /// Bus stop or bus interchange
    BusStop,
    /// Any other public transport stop (tram, light rail, generic transit)
    TransitStop,
    /// Everything else
    #[default]
    Generic,
}

impl PlaceCategory {
    /// Classify a list of provider type tags.
    ///
    /// More specific tags win: a place tagged both `transit_station` and
    /// `train_station` is a [`TrainStation`](Self::TrainStation).
    pub fn from_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut category = Self::Generic;
        for tag in types {
            match tag.as_ref() {
                "train_station" => return Self::TrainStation,
                "bus_stop" | "bus_station" => category = Self::BusStop,
                "transit_station" | "light_rail_station" | "subway_station"
                    if category == Self::Generic =>
                {
                    category = Self::TransitStop;
                }
                _ => {}
            }
        }
        category
    }

    pub fn is_transit(self) -> bool {
        !matches!(self, Self::Generic)
    }
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite and within their geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// A candidate place returned by a text search, not yet resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Opaque provider identifier, passed back to `fetch_details`
    pub place_id: String,
    /// Main display line, e.g. "Flinders Street Station"
    pub primary_text: String,
    /// Secondary display line, e.g. "Flinders Street, Melbourne VIC"
    #[serde(default)]
    pub secondary_text: Option<String>,
    /// Provider type tags used for the category hint
    #[serde(default)]
    pub types: Vec<String>,
}

impl Prediction {
    pub fn new(place_id: impl Into<String>, primary_text: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            primary_text: primary_text.into(),
            secondary_text: None,
            types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_secondary_text(mut self, text: impl Into<String>) -> Self {
        self.secondary_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Primary and secondary text joined the way a single-line list row shows them.
    pub fn full_text(&self) -> String {
        match &self.secondary_text {
            Some(secondary) => format!("{}, {secondary}", self.primary_text),
            None => self.primary_text.clone(),
        }
    }

    pub fn category(&self) -> PlaceCategory {
        PlaceCategory::from_types(&self.types)
    }
}

/// A fully resolved place.
///
/// # Examples
///
/// ```rust
/// use wayfinder_places::{LatLng, Place};
///
/// let place = Place::new("p1", "Flinders Street Station", LatLng::new(-37.8183, 144.9671))
///     .with_types(["train_station"]);
/// assert!(place.category().is_transit());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub location: LatLng,
    #[serde(default)]
    pub types: Vec<String>,
}

impl Place {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, location: LatLng) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            formatted_address: None,
            location,
            types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.formatted_address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn category(&self) -> PlaceCategory {
        PlaceCategory::from_types(&self.types)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_name, self.location)?;
        if let Some(address) = &self.formatted_address {
            write!(f, " [{address}]")?;
        }
        Ok(())
    }
}
