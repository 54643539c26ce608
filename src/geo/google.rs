use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{
    AddressComponents, GeoError, GeocodedAddress, Geocoder, LatLng, PlaceDetails, Prediction, MAX_PREDICTIONS,
};
use crate::domain::DEFAULT_COUNTRY;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct Component {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<Component>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceResult>,
}

/// Maps provider status codes that are not `OK`.
fn check_status(status: &str, error_message: Option<String>) -> Result<(), GeoError> {
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(GeoError::NotFound),
        "REQUEST_DENIED" => Err(GeoError::Denied(
            error_message.unwrap_or_else(|| "check the API key".to_string()),
        )),
        other => Err(GeoError::Upstream(match error_message {
            Some(message) => format!("{other}: {message}"),
            None => other.to_string(),
        })),
    }
}

fn component<'a>(components: &'a [Component], types: &[&str]) -> Option<&'a str> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| types.contains(&t.as_str())))
        .map(|c| c.long_name.as_str())
}

fn split_components(formatted_address: &str, components: &[Component]) -> AddressComponents {
    let street = [
        component(components, &["street_number"]),
        component(components, &["route"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");
    let address_line1 = if street.is_empty() {
        formatted_address.split(',').next().unwrap_or_default().trim().to_string()
    } else {
        street
    };

    AddressComponents {
        address_line1,
        city: component(components, &["locality", "sublocality"])
            .or_else(|| component(components, &["administrative_area_level_2"]))
            .unwrap_or_default()
            .to_string(),
        state_province: component(components, &["administrative_area_level_1"])
            .unwrap_or_default()
            .to_string(),
        postal_code: component(components, &["postal_code"]).unwrap_or_default().to_string(),
        country: component(components, &["country"]).unwrap_or_default().to_string(),
    }
}

/// Google Geocoding and Places details over HTTPS.
pub struct GoogleMapsGeocoder {
    client: Client,
    api_key: String,
}

impl GoogleMapsGeocoder {
    pub fn new(api_key: String) -> Result<Self, GeoError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, api_key })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, params: &[(&str, &str)]) -> Result<T, GeoError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Maps provider returned an error status");
            return Err(GeoError::Upstream(format!("HTTP {status}")));
        }
        response
            .json()
            .await
            .map_err(|e| GeoError::Upstream(format!("undecodable response: {e}")))
    }

    async fn geocode_all(&self, address: &str) -> Result<Vec<GeocodeResult>, GeoError> {
        let body: GeocodeResponse = self
            .get(GEOCODE_URL, &[("address", address), ("region", "za")])
            .await?;
        check_status(&body.status, body.error_message)?;
        Ok(body.results)
    }
}

#[async_trait]
impl Geocoder for GoogleMapsGeocoder {
    #[instrument(skip(self))]
    async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>, GeoError> {
        let results = match self.geocode_all(&format!("{input}, {DEFAULT_COUNTRY}")).await {
            Ok(results) => results,
            Err(GeoError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(results
            .into_iter()
            .take(MAX_PREDICTIONS)
            .map(|result| Prediction {
                place_id: result.place_id,
                description: result.formatted_address,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, GeoError> {
        let body: PlaceDetailsResponse = self
            .get(
                PLACE_DETAILS_URL,
                &[
                    ("place_id", place_id),
                    ("fields", "address_components,formatted_address,geometry"),
                ],
            )
            .await?;
        check_status(&body.status, body.error_message)?;
        let result = body.result.ok_or(GeoError::NotFound)?;

        Ok(PlaceDetails {
            address_components: split_components(&result.formatted_address, &result.address_components),
            coordinates: result.geometry.location,
            formatted_address: result.formatted_address,
        })
    }

    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeoError> {
        let first = self
            .geocode_all(address)
            .await?
            .into_iter()
            .next()
            .ok_or(GeoError::NotFound)?;
        Ok(GeocodedAddress {
            formatted_address: first.formatted_address,
            coordinates: first.geometry.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_errors() {
        assert!(check_status("OK", None).is_ok());
        assert!(matches!(check_status("ZERO_RESULTS", None), Err(GeoError::NotFound)));
        assert!(matches!(
            check_status("REQUEST_DENIED", Some("bad key".to_string())),
            Err(GeoError::Denied(m)) if m == "bad key"
        ));
        assert!(matches!(check_status("OVER_QUERY_LIMIT", None), Err(GeoError::Upstream(_))));
    }

    #[test]
    fn place_details_are_split_into_form_fields() {
        let body: PlaceDetailsResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "result": {
                "formatted_address": "12 Kerk St, Stellenbosch, 7600, South Africa",
                "geometry": {"location": {"lat": -33.93, "lng": 18.86}},
                "address_components": [
                    {"long_name": "12", "types": ["street_number"]},
                    {"long_name": "Kerk Street", "types": ["route"]},
                    {"long_name": "Cape Winelands", "types": ["administrative_area_level_2", "political"]},
                    {"long_name": "Western Cape", "types": ["administrative_area_level_1", "political"]},
                    {"long_name": "7600", "types": ["postal_code"]},
                    {"long_name": "South Africa", "types": ["country", "political"]}
                ]
            }
        }))
        .unwrap();
        let result = body.result.unwrap();
        let split = split_components(&result.formatted_address, &result.address_components);

        assert_eq!(split.address_line1, "12 Kerk Street");
        assert_eq!(split.city, "Cape Winelands");
        assert_eq!(split.state_province, "Western Cape");
        assert_eq!(split.postal_code, "7600");
        assert_eq!(split.country, "South Africa");
    }

    #[test]
    fn missing_street_falls_back_to_first_address_segment() {
        let split = split_components("Somerset Mall, Somerset West, South Africa", &[]);
        assert_eq!(split.address_line1, "Somerset Mall");
        assert_eq!(split.city, "");
    }
}
