//! A weather and air-quality station.
//!
//! Gathers outdoor conditions from a forecast page and indoor conditions from
//! a room sensor and a CO2 sensor, then draws them on a tri-colour e-ink panel.
//! Each run is one pass: geocode, scrape, fetch, compose, display.
//!
//! # Building
//! The `simulator` feature (default) writes the face to a PNG.
//! The `hardware` feature drives an Inky pHAT; it requires SPI and I2C
//! enabled on the host.
//!
use std::{fmt::Display, str::FromStr};

pub mod atmosphere;
pub mod canvas;
pub mod config;
pub mod face;
pub mod geocode;
pub mod icon;
pub mod resources;
pub mod weather;

#[cfg(feature = "simulator")]
pub mod simulator;

#[cfg(feature = "hardware")]
pub mod eink_display;

use atmosphere::{ClimateSource, Co2Source, SensorReading};
use canvas::{Canvas, TriColor};
use chrono::{DateTime, Local};
use config::{Config, ConfigError};
use embedded_graphics::prelude::Size;
use face::Scene;
use geocode::Geocoder;
use resources::Resources;
use weather::{WeatherReading, WeatherSource};

/// Everything that can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geocode(#[from] geocode::Error),
    #[error("no location found for {0:?}")]
    NotFound(String),
    #[error(transparent)]
    Weather(#[from] weather::Error),
    #[error(transparent)]
    Atmosphere(#[from] atmosphere::Error),
    #[error(transparent)]
    Resources(#[from] resources::Error),
    #[error("panel: {0}")]
    Panel(#[from] PanelError),
}

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("unsupported panel resolution {0}x{1}")]
    Unsupported(u32, u32),
    #[error("invalid resolution {0:?}; expected WIDTHxHEIGHT")]
    InvalidResolution(String),
    #[error("image is {0}, panel is {1}")]
    SizeMismatch(Resolution, Resolution),
    #[error("{0}")]
    Driver(String),
}

/// Pixel dimensions of a supported panel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    pub const PHAT_212X104: Resolution = Resolution {
        width: 212,
        height: 104,
    };
    pub const PHAT_250X122: Resolution = Resolution {
        width: 250,
        height: 122,
    };

    /// Validate a panel resolution; only the two pHAT sizes are supported.
    pub fn new(width: u32, height: u32) -> Result<Self, PanelError> {
        [Self::PHAT_212X104, Self::PHAT_250X122]
            .into_iter()
            .find(|r| r.width == width && r.height == height)
            .ok_or(PanelError::Unsupported(width, height))
    }

    /// Pick the resolution from a panel's identification.
    ///
    /// An identification that could not be read falls back to `fallback`;
    /// one that names an unsupported size is an error.
    pub fn detected<E: Display>(
        identified: Result<(u32, u32), E>,
        fallback: Resolution,
    ) -> Result<Self, PanelError> {
        match identified {
            Ok((width, height)) => Resolution::new(width, height),
            Err(e) => {
                tracing::warn!("could not identify panel ({}); assuming {}", e, fallback);
                Ok(fallback)
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PanelError::InvalidResolution(s.to_owned());
        let (w, h) = s.split_once('x').ok_or_else(invalid)?;
        let w = w.trim().parse().map_err(|_| invalid())?;
        let h = h.trim().parse().map_err(|_| invalid())?;
        Resolution::new(w, h)
    }
}

/// A Panel is the sink for a composed face.
/// In real hardware, this is a tri-colour Inky pHAT.
pub trait Panel {
    /// Resolution the face must be drawn at.
    fn resolution(&self) -> Resolution;

    /// Set the colour of the border around the active area.
    fn set_border(&mut self, color: TriColor);

    /// Stage a composed face for the next `show`.
    fn set_image(&mut self, canvas: &Canvas) -> Result<(), PanelError>;

    /// Refresh the panel with the staged face.
    fn show(&mut self) -> Result<(), PanelError>;
}

/// Check that a canvas was drawn for the given panel.
pub fn check_size(canvas: &Canvas, resolution: Resolution) -> Result<(), PanelError> {
    use embedded_graphics::prelude::OriginDimensions;
    let size = canvas.size();
    if size != resolution.size() {
        return Err(PanelError::SizeMismatch(
            Resolution {
                width: size.width,
                height: size.height,
            },
            resolution,
        ));
    }
    Ok(())
}

/// Everything gathered from the outside world in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    /// Current weather; None if the forecast page had nothing.
    pub weather: Option<WeatherReading>,
    /// Indoor readings; None when there is no weather, and the face shows zeros.
    pub sensor: Option<SensorReading>,
}

/// The external sources a run reads from.
pub struct Station<'a> {
    pub geocoder: &'a dyn Geocoder,
    pub weather: &'a dyn WeatherSource,
    pub climate: &'a dyn ClimateSource,
    pub co2: &'a dyn Co2Source,
}

impl Station<'_> {
    /// Locate the configured city, then read the weather there and the indoor sensors.
    ///
    /// If the forecast page has nothing, the sensors are not read.
    pub fn gather(&self, config: &Config) -> Result<Observation, Error> {
        let address = config.address();
        let at = self
            .geocoder
            .locate(&address)?
            .ok_or_else(|| Error::NotFound(address.clone()))?;
        tracing::info!("located {} at {}", address, at);

        let Some(weather) = self.weather.current(at)? else {
            tracing::warn!("no weather information found");
            return Ok(Observation::default());
        };
        tracing::info!(
            "weather: {}, pressure {} hPa",
            weather.summary,
            weather.pressure
        );

        let sensor = atmosphere::sample(self.climate, self.co2)?;
        tracing::info!(
            "indoors: {}°C, {}% humidity, {} ppm CO2",
            sensor.temperature,
            sensor.humidity,
            sensor.co2
        );
        Ok(Observation {
            weather: Some(weather),
            sensor: Some(sensor),
        })
    }
}

/// Compose the face for an observation and push it to the panel.
/// Returns the scene that was drawn.
pub fn render(
    config: &Config,
    time: DateTime<Local>,
    observation: &Observation,
    resources: &Resources,
    panel: &mut impl Panel,
) -> Result<Scene, Error> {
    let icon = observation
        .weather
        .as_ref()
        .and_then(|w| icon::resolve(&w.summary));
    if let (Some(weather), None) = (&observation.weather, icon) {
        tracing::warn!("no icon for weather {:?}", weather.summary);
    }

    let scene = Scene::plan(config.co2_threshold, time, observation.sensor.as_ref(), icon);
    let canvas = scene.draw(resources, panel.resolution());

    tracing::info!("rendering face at {}", panel.resolution());
    panel.set_border(config.border);
    panel.set_image(&canvas)?;
    panel.show()?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::{Climate, FakeClimate, FakeCo2};
    use crate::canvas::IndexedImage;
    use crate::face::{Background, IconSlot, NORMAL_PHRASE};
    use crate::geocode::{Coordinates, FakeGeocoder};
    use crate::icon::IconCategory;
    use crate::resources::Icon;
    use crate::weather::FakeWeather;
    use chrono::TimeZone;
    use embedded_graphics::prelude::Point;

    /// Panel that keeps what it was given.
    struct RecordingPanel {
        resolution: Resolution,
        border: Option<TriColor>,
        staged: Option<Canvas>,
        shown: usize,
    }

    impl RecordingPanel {
        fn new(resolution: Resolution) -> Self {
            RecordingPanel {
                resolution,
                border: None,
                staged: None,
                shown: 0,
            }
        }
    }

    impl Panel for RecordingPanel {
        fn resolution(&self) -> Resolution {
            self.resolution
        }

        fn set_border(&mut self, color: TriColor) {
            self.border = Some(color);
        }

        fn set_image(&mut self, canvas: &Canvas) -> Result<(), PanelError> {
            check_size(canvas, self.resolution)?;
            self.staged = Some(canvas.clone());
            Ok(())
        }

        fn show(&mut self) -> Result<(), PanelError> {
            self.shown += 1;
            Ok(())
        }
    }

    struct UnreachableCo2;

    impl Co2Source for UnreachableCo2 {
        fn co2(&self) -> Result<i64, atmosphere::Error> {
            panic!("sensors should not be read without weather");
        }
    }

    fn shibuya() -> FakeGeocoder {
        FakeGeocoder {
            coordinates: Some(Coordinates {
                latitude: 35.66,
                longitude: 139.7,
            }),
        }
    }

    fn room() -> FakeClimate {
        FakeClimate {
            climate: Climate {
                temperature: 21.5,
                humidity: 48,
            },
        }
    }

    fn resources() -> Resources {
        let size = Resolution::PHAT_250X122.size();
        Resources::new(
            IndexedImage::filled(size, TriColor::Black),
            IndexedImage::filled(size, TriColor::Red),
        )
        .with_icon(
            IconCategory::Sun,
            Icon::new(IndexedImage::filled(Size::new(8, 8), TriColor::Red)),
        )
    }

    fn evening() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap()
    }

    #[test]
    fn resolutions() {
        assert_eq!(
            "250x122".parse::<Resolution>().expect("supported"),
            Resolution::PHAT_250X122
        );
        assert_eq!(
            Resolution::new(212, 104).expect("supported"),
            Resolution::PHAT_212X104
        );
        assert!(matches!(
            Resolution::new(400, 300),
            Err(PanelError::Unsupported(400, 300))
        ));
        assert!(matches!(
            "big".parse::<Resolution>(),
            Err(PanelError::InvalidResolution(_))
        ));
    }

    #[test]
    fn detected_resolution() {
        let fallback = Resolution::PHAT_250X122;
        assert_eq!(
            Resolution::detected(Ok::<_, String>((212, 104)), fallback).expect("supported"),
            Resolution::PHAT_212X104
        );
        assert_eq!(
            Resolution::detected(Err("EEPROM is blank"), fallback).expect("falls back"),
            fallback
        );
        assert!(matches!(
            Resolution::detected(Ok::<_, String>((400, 300)), fallback),
            Err(PanelError::Unsupported(400, 300))
        ));
    }

    #[test]
    fn end_to_end_clear_day() {
        let weather = FakeWeather {
            reading: Some(WeatherReading {
                summary: "clear-day".to_owned(),
                pressure: 1012,
            }),
        };
        let station = Station {
            geocoder: &shibuya(),
            weather: &weather,
            climate: &room(),
            co2: &FakeCo2 { ppm: 450 },
        };
        let config = Config::default();
        let observation = station.gather(&config).expect("fakes don't fail");
        assert_eq!(
            observation.sensor,
            Some(SensorReading {
                temperature: 21.5,
                humidity: 48,
                co2: 450,
            })
        );

        let mut panel = RecordingPanel::new(Resolution::PHAT_250X122);
        let scene = render(&config, evening(), &observation, &resources(), &mut panel)
            .expect("render should succeed");

        assert_eq!(scene.background, Background::Simple);
        assert_eq!(scene.icon, IconSlot::Icon(IconCategory::Sun));
        assert_eq!(scene.climate.text, "T:21.5°C  H:48%");
        assert_eq!(scene.co2.text, "CO2:450ppm");
        assert_eq!(scene.status.text, NORMAL_PHRASE);
        assert_eq!(scene.date.text, "2024/01/02 Tue");

        assert_eq!(panel.border, Some(TriColor::Black));
        assert_eq!(panel.shown, 1);
        let staged = panel.staged.expect("image was staged");
        assert_eq!(
            staged.pixel(Point::new(11 + 4, 36 + 4)),
            Some(TriColor::Red)
        );
    }

    #[test]
    fn end_to_end_no_weather() {
        let station = Station {
            geocoder: &shibuya(),
            weather: &FakeWeather { reading: None },
            climate: &room(),
            co2: &UnreachableCo2,
        };
        let config = Config::default();
        let observation = station.gather(&config).expect("missing weather is not an error");
        assert_eq!(observation, Observation::default());

        let mut panel = RecordingPanel::new(Resolution::PHAT_212X104);
        let scene = render(&config, evening(), &observation, &resources(), &mut panel)
            .expect("render should succeed");
        assert_eq!(scene.icon, IconSlot::Placeholder);
        assert_eq!(scene.climate.text, "T:0°C  H:0%");
        assert_eq!(scene.co2.text, "CO2:0ppm");
        assert_eq!(scene.background, Background::Simple);
        assert_eq!(panel.shown, 1);
    }

    #[test]
    fn unknown_place() {
        let station = Station {
            geocoder: &FakeGeocoder { coordinates: None },
            weather: &FakeWeather { reading: None },
            climate: &room(),
            co2: &UnreachableCo2,
        };
        let err = station.gather(&Config::default()).expect_err("no location");
        assert!(matches!(err, Error::NotFound(ref a) if a == "Shibuya, JP"));
    }

    #[test]
    fn unknown_summary_uses_placeholder() {
        let observation = Observation {
            weather: Some(WeatherReading {
                summary: "meteor-shower".to_owned(),
                pressure: 990,
            }),
            sensor: Some(SensorReading {
                temperature: 19.0,
                humidity: 40,
                co2: 1200,
            }),
        };
        let mut panel = RecordingPanel::new(Resolution::PHAT_250X122);
        let scene = render(
            &Config::default(),
            evening(),
            &observation,
            &resources(),
            &mut panel,
        )
        .expect("render should succeed");
        assert_eq!(scene.icon, IconSlot::Placeholder);
        assert_eq!(scene.background, Background::Warning);
        assert_eq!(scene.climate.text, "T:19.0°C  H:40%");
    }

    #[test]
    fn size_mismatch() {
        let canvas = Canvas::new(Size::new(10, 10));
        assert!(matches!(
            check_size(&canvas, Resolution::PHAT_250X122),
            Err(PanelError::SizeMismatch(..))
        ));
    }
}
