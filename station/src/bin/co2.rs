//! Demo of reading the remote CO2 sensor.

use argh::FromArgs;
use station::atmosphere::{ssh::SshCommand, Co2Source};
use station::config::Config;
use std::thread;
use std::time::Duration;

const PERIOD: Duration = Duration::from_secs(2);

#[derive(FromArgs)]
/// Read the CO2 sensor over ssh.
struct Args {
    /// path to the configuration file; defaults apply if omitted
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// number of samples to take
    #[argh(option, short = 'n', default = "1")]
    samples: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let sensor = SshCommand::from_config(&config.co2);
    for i in 0..args.samples {
        if i > 0 {
            thread::sleep(PERIOD);
        }
        match sensor.co2() {
            Ok(ppm) => println!("co2: {} ppm", ppm),
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}
