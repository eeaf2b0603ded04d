//! Station configuration, loaded from YAML.
//!
//! Every field has a default, so a file only needs to name what differs:
//!
//! ```yaml
//! city: Shibuya
//! country_code: JP
//! co2_threshold: 1000
//! sensor:
//!   token: "..."
//! co2:
//!   host: watcher.local
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::canvas::TriColor;

/// Environment variable consulted for the sensor API token when the file has none.
pub const TOKEN_ENV: &str = "STATION_API_TOKEN";

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// City to report the weather for.
    pub city: String,
    /// Country code qualifying the city, e.g. "JP".
    pub country_code: String,
    /// CO2 concentration (ppm) above which the face switches to its warning look.
    pub co2_threshold: i64,
    pub geocoder: GeocoderConfig,
    pub weather: WeatherConfig,
    pub sensor: SensorConfig,
    pub co2: Co2Config,
    /// Timeout for each HTTP request; unset waits indefinitely.
    pub http_timeout_secs: Option<u64>,
    /// Directory holding the background and icon images.
    pub resources: PathBuf,
    /// Border colour around the panel's active area.
    pub border: TriColor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// ArcGIS `find` endpoint.
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL of the forecast pages; coordinates are appended.
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Devices endpoint of the cloud sensor API.
    pub endpoint: String,
    /// Bearer token for the API.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Co2Config {
    /// ssh client to run.
    pub ssh: String,
    pub user: String,
    pub host: String,
    /// Command run on the host; prints `{"co2": <ppm>}`.
    pub command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            city: "Shibuya".to_owned(),
            country_code: "JP".to_owned(),
            co2_threshold: 1000,
            geocoder: GeocoderConfig::default(),
            weather: WeatherConfig::default(),
            sensor: SensorConfig::default(),
            co2: Co2Config::default(),
            http_timeout_secs: None,
            resources: PathBuf::from("resources"),
            border: TriColor::Black,
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        GeocoderConfig {
            endpoint: "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer/find"
                .to_owned(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            endpoint: "https://darksky.net/forecast".to_owned(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            endpoint: "https://api.nature.global/1/devices".to_owned(),
            token: None,
        }
    }
}

impl Default for Co2Config {
    fn default() -> Self {
        Co2Config {
            ssh: "ssh".to_owned(),
            user: "pi".to_owned(),
            host: "watcher.local".to_owned(),
            command: "sudo python -m mh_z19".to_owned(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The free-text address handed to the geocoder.
    pub fn address(&self) -> String {
        format!("{}, {}", self.city, self.country_code)
    }

    /// The sensor API token, from the file or the environment.
    pub fn token(&self) -> Result<String, ConfigError> {
        if let Some(token) = self.sensor.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(ConfigError::MissingToken),
        }
    }

    /// HTTP client shared by every request of a run.
    pub fn http_client(&self) -> reqwest::Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.http_timeout_secs.map(Duration::from_secs))
            .build()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("no sensor API token: set sensor.token or STATION_API_TOKEN")]
    MissingToken,
}
