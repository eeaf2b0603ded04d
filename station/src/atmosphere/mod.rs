//! Types for surfacing indoor atmospheric data.
//!
//! Temperature and humidity come from a cloud-connected room sensor ([`remo`]);
//! CO2 concentration from a sensor on another host, read over ssh ([`ssh`]).

pub mod remo;
pub mod ssh;

/// A sample of indoor conditions.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Relative humidity as a whole percentage.
    pub humidity: i64,

    /// Carbon dioxide concentration in parts per million.
    pub co2: i64,
}

/// Temperature and humidity, as reported together by a room sensor.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    pub temperature: f64,
    pub humidity: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sensor API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed sensor data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sensor data has no {0}")]
    MissingField(&'static str),
    #[error("could not run sensor command: {0}")]
    Io(#[from] std::io::Error),
    #[error("sensor command failed ({status}): {stderr}")]
    Command { status: String, stderr: String },
}

/// A type that can get the room temperature and humidity.
pub trait ClimateSource {
    fn climate(&self) -> Result<Climate, Error>;
}

/// A type that can get the CO2 concentration, in ppm.
pub trait Co2Source {
    fn co2(&self) -> Result<i64, Error>;
}

/// Read both sources into a single reading.
pub fn sample(climate: &dyn ClimateSource, co2: &dyn Co2Source) -> Result<SensorReading, Error> {
    let Climate {
        temperature,
        humidity,
    } = climate.climate()?;
    let co2 = co2.co2()?;
    tracing::debug!("temperature {temperature} humidity {humidity} co2 {co2}");
    Ok(SensorReading {
        temperature,
        humidity,
        co2,
    })
}

/// Fake climate source: repeatedly provides the indicated climate.
pub struct FakeClimate {
    pub climate: Climate,
}

impl ClimateSource for FakeClimate {
    fn climate(&self) -> Result<Climate, Error> {
        Ok(self.climate)
    }
}

/// Fake CO2 source: repeatedly provides the indicated concentration.
pub struct FakeCo2 {
    pub ppm: i64,
}

impl Co2Source for FakeCo2 {
    fn co2(&self) -> Result<i64, Error> {
        Ok(self.ppm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenCo2;

    impl Co2Source for BrokenCo2 {
        fn co2(&self) -> Result<i64, Error> {
            Err(Error::MissingField("co2"))
        }
    }

    #[test]
    fn merges_sources() {
        let climate = FakeClimate {
            climate: Climate {
                temperature: 21.5,
                humidity: 48,
            },
        };
        let reading = sample(&climate, &FakeCo2 { ppm: 450 }).expect("fakes don't fail");
        assert_eq!(
            reading,
            SensorReading {
                temperature: 21.5,
                humidity: 48,
                co2: 450,
            }
        );
    }

    #[test]
    fn either_failure_fails() {
        let climate = FakeClimate {
            climate: Climate::default(),
        };
        let err = sample(&climate, &BrokenCo2).expect_err("co2 source fails");
        assert!(matches!(err, Error::MissingField("co2")));
    }
}
