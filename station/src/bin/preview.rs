//! Renders the face for every weather icon, in both CO2 states, without touching the network.

use std::path::{Path, PathBuf};

use argh::FromArgs;
use chrono::Local;
use station::{
    atmosphere::SensorReading,
    config::Config,
    icon::IconCategory,
    render,
    resources::Resources,
    simulator::SimPanel,
    weather::WeatherReading,
    Observation, Resolution,
};

#[derive(FromArgs)]
/// Render sample faces to a directory.
struct Args {
    /// directory holding the background and icon images
    #[argh(option, default = "String::from(\"resources\")")]
    resources: String,

    /// panel resolution: 250x122 or 212x104
    #[argh(option, short = 'r', default = "Resolution::PHAT_250X122")]
    resolution: Resolution,

    /// screenshot scale factor
    #[argh(option, default = "4")]
    scale: u32,

    /// output directory
    #[argh(positional)]
    outdir: PathBuf,
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();
    std::fs::create_dir_all(&args.outdir)?;

    let config = Config::default();
    let resources = Resources::load(Path::new(&args.resources))?;
    let t = Local::now();

    for category in IconCategory::ALL {
        let Some(summary) = category.tokens().first() else {
            continue;
        };
        for co2 in [450, config.co2_threshold + 500] {
            let observation = Observation {
                weather: Some(WeatherReading {
                    summary: summary.to_string(),
                    pressure: 1013,
                }),
                sensor: Some(SensorReading {
                    temperature: 21.5,
                    humidity: 48,
                    co2,
                }),
            };
            let path = args.outdir.join(format!("{}-{}.png", category, co2));
            let mut panel = SimPanel::new(args.resolution, &path).with_scale(args.scale);
            render(&config, t, &observation, &resources, &mut panel)?;
        }
    }
    Ok(())
}
