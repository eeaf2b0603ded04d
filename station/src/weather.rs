//! Current conditions, scraped from a public forecast page.
//!
//! The page is fetched for the station's coordinates; the markup carries
//!
//! - `<span class="currently">` whose first `<img>` has an `alt` such as
//!   `"clear-day Clear"`; the first word is the summary token;
//! - `<div class="pressure">` whose `<span class="num">` holds the pressure in hPa.
//!
//! The page is not an API: if its shape changes, parsing fails with
//! [`Error::PageShape`] rather than guessing.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};

use crate::geocode::Coordinates;

/// Current weather, as read off the forecast page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReading {
    /// Summary token, e.g. "clear-day".
    pub summary: String,
    /// Barometric pressure, hPa.
    pub pressure: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("forecast request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("forecast page shape changed: {0}")]
    PageShape(&'static str),
}

/// A type that can get the current weather.
pub trait WeatherSource {
    /// Get the current weather at the given place.
    /// Returns None if the source has nothing for us right now.
    fn current(&self, at: Coordinates) -> Result<Option<WeatherReading>, Error>;
}

/// The forecast website.
pub struct ForecastPage {
    client: Client,
    endpoint: String,
}

impl ForecastPage {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        ForecastPage {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Page URL for the given place, in SI units and English.
    pub fn url(&self, at: Coordinates) -> String {
        format!("{}/{}/uk212/en", self.endpoint.trim_end_matches('/'), at)
    }
}

impl WeatherSource for ForecastPage {
    fn current(&self, at: Coordinates) -> Result<Option<WeatherReading>, Error> {
        let url = self.url(at);
        tracing::info!("fetching forecast from {}", url);
        let response = self.client.get(&url).send()?;
        reading_from(response.status(), || response.text())
    }
}

/// Interpret a forecast page response. Anything but 200 means no reading;
/// the body is only read for a 200.
fn reading_from(
    status: StatusCode,
    body: impl FnOnce() -> reqwest::Result<String>,
) -> Result<Option<WeatherReading>, Error> {
    if status != StatusCode::OK {
        tracing::warn!("forecast page returned {}", status);
        return Ok(None);
    }
    parse_forecast(&body()?).map(Some)
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector should parse")
}

fn first<'a>(scope: ElementRef<'a>, css: &'static str) -> Option<ElementRef<'a>> {
    scope.select(&selector(css)).next()
}

/// Extract the current conditions from a forecast page.
pub fn parse_forecast(html: &str) -> Result<WeatherReading, Error> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let currently =
        first(root, "span.currently").ok_or(Error::PageShape("no current conditions"))?;
    let alt = first(currently, "img")
        .and_then(|img| img.value().attr("alt"))
        .ok_or(Error::PageShape("current conditions have no icon"))?;
    let summary = alt
        .split_whitespace()
        .next()
        .ok_or(Error::PageShape("current conditions icon has no name"))?;

    let pressure = first(root, "div.pressure").ok_or(Error::PageShape("no pressure"))?;
    let pressure = first(pressure, "span.num")
        .ok_or(Error::PageShape("pressure has no value"))?
        .text()
        .collect::<String>()
        .trim()
        .parse()
        .map_err(|_| Error::PageShape("pressure is not a number"))?;

    Ok(WeatherReading {
        summary: summary.to_owned(),
        pressure,
    })
}

/// Fake weather source: repeatedly provides the indicated reading.
pub struct FakeWeather {
    pub reading: Option<WeatherReading>,
}

impl WeatherSource for FakeWeather {
    fn current(&self, _at: Coordinates) -> Result<Option<WeatherReading>, Error> {
        Ok(self.reading.clone())
    }
}
