//! One-shot map generation from the command line.
//!
//! Runs the same pipeline as the server for a single request and prints the
//! JSON response. With `--lat`/`--lon` the geocoding step is skipped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use geo::Point;
use tracing::info;
use tracing_subscriber::EnvFilter;

use georadius::config::{Config, PublishBackend};
use georadius::models::request::RadiusInput;
use georadius::models::RawMapRequest;
use georadius::MapService;

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Render and publish one radius map")]
struct Args {
    /// Place to center the circle on
    #[arg(short, long)]
    place: String,

    /// Admin-1 region (province, state) the place belongs to
    #[arg(short, long)]
    admin1: String,

    /// Radius in kilometers
    #[arg(short, long)]
    radius: f64,

    /// Fill color for included regions (#rrggbb or a color name)
    #[arg(long)]
    color: Option<String>,

    /// Output base name
    #[arg(short, long)]
    name: String,

    /// Center latitude, skips geocoding together with --lon
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Center longitude, skips geocoding together with --lat
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Region dataset, overrides the config file
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Publish into this directory instead of the configured backend
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn raw_request(&self) -> RawMapRequest {
        RawMapRequest {
            place: Some(self.place.clone()),
            admin1: Some(self.admin1.clone()),
            radius: Some(RadiusInput::Number(self.radius)),
            color: self.color.clone(),
            name: Some(self.name.clone()),
        }
    }

    fn center(&self) -> Result<Option<Point<f64>>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    bail!("coordinates out of range: lat {}, lon {}", lat, lon);
                }
                Ok(Some(Point::new(lon, lat)))
            }
            _ => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(dataset) = &args.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.publish.backend = PublishBackend::Local;
        config.publish.local.output_dir = dir.clone();
    }

    let center = args.center()?;
    let raw = args.raw_request();

    let service = tokio::task::spawn_blocking(move || MapService::from_config(config))
        .await?
        .context("Failed to initialize map service")?;
    let service = Arc::new(service);

    let response = match center {
        Some(point) => {
            let request = service.validate(raw)?;
            info!("Using explicit center ({}, {})", point.y(), point.x());
            service.generate_at(request, point).await?
        }
        None => service.handle(raw).await?,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
