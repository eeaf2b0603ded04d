//! Temperature and humidity from the Nature Remo cloud API.
//!
//! `GET /1/devices` lists every device on the account. Each carries its latest
//! sensor events under `newest_events`, keyed by kind:
//! `te` (temperature, °C), `hu` (relative humidity, %), `il` (illuminance).
//! Only the first device is read.

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use super::{Climate, ClimateSource, Error};

/// Client for the devices endpoint.
pub struct RemoApi {
    client: Client,
    endpoint: String,
    token: String,
}

impl RemoApi {
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        RemoApi {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

impl ClimateSource for RemoApi {
    fn climate(&self) -> Result<Climate, Error> {
        tracing::info!("fetching room sensor from {}", self.endpoint);
        let body = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .text()?;
        parse_devices(&body)
    }
}

#[derive(Deserialize)]
struct Device {
    #[serde(default)]
    newest_events: NewestEvents,
}

#[derive(Deserialize, Default)]
struct NewestEvents {
    te: Option<Event>,
    hu: Option<Event>,
}

#[derive(Deserialize)]
struct Event {
    val: f64,
}

/// Decode the climate reported by the first device in a devices listing.
pub fn parse_devices(body: &str) -> Result<Climate, Error> {
    let devices: Vec<Device> = serde_json::from_str(body)?;
    let events = &devices
        .first()
        .ok_or(Error::MissingField("device"))?
        .newest_events;
    let temperature = events
        .te
        .as_ref()
        .ok_or(Error::MissingField("newest_events.te.val"))?
        .val;
    let humidity = events
        .hu
        .as_ref()
        .ok_or(Error::MissingField("newest_events.hu.val"))?
        .val;
    Ok(Climate {
        temperature,
        // Whole percent; truncates like the sensor's own display.
        humidity: humidity as i64,
    })
}
