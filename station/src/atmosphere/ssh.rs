//! CO2 concentration from an MH-Z19 sensor attached to another host.
//!
//! The sensor is read by running a command on that host over ssh;
//! `python -m mh_z19` prints a JSON object such as `{"co2": 450}`.

use std::fmt::Display;
use std::process::Command;

use serde::Deserialize;

use super::{Co2Source, Error};
use crate::config::Co2Config;

/// Runs the sensor command on a remote host.
pub struct SshCommand {
    program: String,
    destination: String,
    command: String,
}

impl SshCommand {
    /// Run `command` as `<program> <destination> <command>`.
    pub fn new(
        program: impl Into<String>,
        destination: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        SshCommand {
            program: program.into(),
            destination: destination.into(),
            command: command.into(),
        }
    }

    pub fn from_config(config: &Co2Config) -> Self {
        Self::new(
            &config.ssh,
            format!("{}@{}", config.user, config.host),
            &config.command,
        )
    }
}

impl Display for SshCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.program, self.destination, self.command)
    }
}

impl Co2Source for SshCommand {
    fn co2(&self) -> Result<i64, Error> {
        tracing::info!("reading CO2 with `{}`", self);
        let output = Command::new(&self.program)
            .arg(&self.destination)
            .arg(&self.command)
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            tracing::error!("CO2 command failed: {}", output.status);
            return Err(Error::Command {
                status: output.status.to_string(),
                stderr,
            });
        }
        parse_co2(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Deserialize)]
struct Co2Output {
    co2: Option<f64>,
}

/// Decode the sensor command's output.
pub fn parse_co2(stdout: &str) -> Result<i64, Error> {
    let output: Co2Output = serde_json::from_str(stdout.trim())?;
    output
        .co2
        .map(|ppm| ppm as i64)
        .ok_or(Error::MissingField("co2"))
}
