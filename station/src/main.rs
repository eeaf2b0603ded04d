use anyhow::Context;
use argh::FromArgs;
use chrono::Local;
use station::{
    atmosphere::{remo::RemoApi, ssh::SshCommand},
    config::Config,
    geocode::ArcGis,
    render,
    resources::Resources,
    weather::ForecastPage,
    Resolution, Station,
};

#[cfg(not(any(feature = "simulator", feature = "hardware")))]
compile_error!("the station binary needs the `simulator` or `hardware` feature");

#[derive(FromArgs)]
/// Show the weather and indoor air quality on an e-ink panel.
struct Args {
    /// path to the configuration file; defaults apply if omitted
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// panel resolution, if it cannot be detected: 250x122 or 212x104
    #[argh(option, short = 'r', default = "Resolution::PHAT_250X122")]
    resolution: Resolution,

    /// where to write the rendered face
    #[cfg(feature = "simulator")]
    #[argh(option, short = 'o', default = "String::from(\"station.png\")")]
    output: String,

    /// screenshot scale factor
    #[cfg(feature = "simulator")]
    #[argh(option, default = "1")]
    scale: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("loading configuration {}", path))?
        }
        None => Config::default(),
    };

    let client = config.http_client()?;
    let geocoder = ArcGis::new(client.clone(), &config.geocoder.endpoint);
    let weather = ForecastPage::new(client.clone(), &config.weather.endpoint);
    let climate = RemoApi::new(client, &config.sensor.endpoint, config.token()?);
    let co2 = SshCommand::from_config(&config.co2);
    let resources = Resources::load(&config.resources)?;

    let station = Station {
        geocoder: &geocoder,
        weather: &weather,
        climate: &climate,
        co2: &co2,
    };
    let observation = station.gather(&config)?;

    #[cfg(feature = "simulator")]
    let mut panel =
        station::simulator::SimPanel::new(args.resolution, &args.output).with_scale(args.scale);

    #[cfg(all(feature = "hardware", not(feature = "simulator")))]
    let mut panel = station::eink_display::InkyPanel::new(args.resolution)?;

    let t = Local::now();
    tracing::info!("rendering station at {}", t);
    let scene = render(&config, t, &observation, &resources, &mut panel)?;
    tracing::info!("{} / {} / {}", scene.climate.text, scene.co2.text, scene.status.text);
    Ok(())
}
