//! Resolve a place name to coordinates with the ArcGIS geocoding service.

use std::fmt::Display;

use reqwest::blocking::Client;
use serde::Deserialize;

/// A latitude/longitude pair, in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected geocoding response: {0}")]
    Json(#[from] serde_json::Error),
}

/// A type that can find a place.
pub trait Geocoder {
    /// Look up a free-text address such as "Shibuya, JP".
    /// Returns None if the provider has no match.
    fn locate(&self, address: &str) -> Result<Option<Coordinates>, Error>;
}

/// Geocoder backed by the ArcGIS World `find` operation.
pub struct ArcGis {
    client: Client,
    endpoint: String,
}

impl ArcGis {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        ArcGis {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Geocoder for ArcGis {
    fn locate(&self, address: &str) -> Result<Option<Coordinates>, Error> {
        tracing::debug!("geocoding {:?} via {}", address, self.endpoint);
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("f", "json"), ("text", address), ("maxLocations", "1")])
            .send()?
            .error_for_status()?
            .text()?;
        parse_find(&body)
    }
}

#[derive(Deserialize)]
struct FindResponse {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct Location {
    feature: Feature,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
}

/// ArcGIS geometries are (x, y) = (longitude, latitude).
#[derive(Deserialize)]
struct Geometry {
    x: f64,
    y: f64,
}

/// Decode the first match of a `find` response.
pub fn parse_find(body: &str) -> Result<Option<Coordinates>, Error> {
    let response: FindResponse = serde_json::from_str(body)?;
    Ok(response.locations.first().map(|l| Coordinates {
        latitude: l.feature.geometry.y,
        longitude: l.feature.geometry.x,
    }))
}

/// Fake geocoder: always provides the indicated answer.
pub struct FakeGeocoder {
    pub coordinates: Option<Coordinates>,
}

impl Geocoder for FakeGeocoder {
    fn locate(&self, _address: &str) -> Result<Option<Coordinates>, Error> {
        Ok(self.coordinates)
    }
}
