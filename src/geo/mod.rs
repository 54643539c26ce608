//! Address lookup backed by a maps provider.

mod google;

pub use google::GoogleMapsGeocoder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DEFAULT_COUNTRY;
use crate::validation::sanitize_string;

/// Most autocomplete suggestions returned per lookup.
pub const MAX_PREDICTIONS: usize = 5;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Maps request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Maps provider denied the request: {0}")]
    Denied(String),

    #[error("No matching place")]
    NotFound,

    #[error("Maps provider error: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
}

/// A place split into the fields of the checkout address form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddressComponents {
    pub address_line1: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetails {
    pub formatted_address: String,
    pub coordinates: LatLng,
    pub address_components: AddressComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedAddress {
    pub formatted_address: String,
    pub coordinates: LatLng,
}

/// Free-text address parts posted to the coordinates lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressQuery {
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressQuery {
    /// Joins the non-empty parts and appends the country.
    ///
    /// Returns `None` when every part before the country is blank.
    pub fn to_search_text(&self) -> Option<String> {
        let parts: Vec<String> = [&self.address_line1, &self.city, &self.state_province, &self.postal_code]
            .into_iter()
            .flatten()
            .map(|part| sanitize_string(part))
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return None;
        }
        let country = self
            .country
            .as_deref()
            .map(sanitize_string)
            .filter(|country| !country.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
        Some(format!("{}, {country}", parts.join(", ")))
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Up to [`MAX_PREDICTIONS`] suggestions for a partial South African address.
    async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>, GeoError>;

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, GeoError>;

    /// First match for a full address.
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeoError>;
}
