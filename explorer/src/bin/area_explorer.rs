//! Command-line driver for the area explorer engine.
//!
//! `discover` runs one discovery session over a rectangle; `overlays` runs
//! the overlay pipeline for one position. Both print JSON on stdout.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use area_explorer::config::ExplorerSettings;
use area_explorer::domain::ports::{FixtureOverlaySource, FixturePoiSource, HeadlessDrawingSurface};
use area_explorer::domain::{
    AirQualityReading, DiscoveryOutcome, ExplorerEngine, ExplorerOptions, ExplorerPorts, GeoBounds,
    GeoPoint, OverlayKind, OverlaySources, OverlayState, SolarInsight, WeatherReading,
};
use area_explorer::outbound::{
    AirQualityHttpSource, PlacesHttpSource, SolarHttpSource, WeatherHttpSource,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `area-explorer` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "area-explorer",
    about = "Discover places in an area and read environmental overlays",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search every category inside a rectangle and print the merged places.
    Discover {
        /// Southern edge latitude.
        #[arg(long, allow_negative_numbers = true)]
        south: f64,
        /// Western edge longitude.
        #[arg(long, allow_negative_numbers = true)]
        west: f64,
        /// Northern edge latitude.
        #[arg(long, allow_negative_numbers = true)]
        north: f64,
        /// Eastern edge longitude.
        #[arg(long, allow_negative_numbers = true)]
        east: f64,
    },
    /// Fetch weather, air quality and solar data for one position.
    Overlays {
        /// Latitude of the position; defaults to the configured map center.
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        /// Longitude of the position.
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
        /// Overlays to leave switched off.
        #[arg(long = "disable", value_name = "overlay")]
        disabled: Vec<OverlayKind>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryReport<'a> {
    summary: String,
    #[serde(flatten)]
    outcome: &'a DiscoveryOutcome,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlayReport<'a> {
    position: GeoPoint,
    weather: &'a OverlayState<WeatherReading>,
    air_quality: &'a OverlayState<AirQualityReading>,
    solar: &'a OverlayState<SolarInsight>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ExplorerSettings::load_from_iter([OsString::from("area-explorer")])
        .map_err(|error| eyre!("failed to load explorer settings: {error}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async move {
        match args.command {
            Command::Discover {
                south,
                west,
                north,
                east,
            } => discover(&settings, south, west, north, east).await,
            Command::Overlays { lat, lon, disabled } => overlays(&settings, lat, lon, &disabled).await,
        }
    })
}

async fn discover(
    settings: &ExplorerSettings,
    south: f64,
    west: f64,
    north: f64,
    east: f64,
) -> Result<()> {
    let bounds = GeoBounds::new(GeoPoint::new(south, west)?, GeoPoint::new(north, east)?)?;
    let places = PlacesHttpSource::new(
        settings.places_endpoint()?,
        settings.api_key()?,
        settings.request_timeout(),
    )
    .wrap_err("failed to build places client")?;

    let ports = ExplorerPorts {
        surface: Arc::new(HeadlessDrawingSurface),
        poi_source: Arc::new(places),
        overlays: OverlaySources {
            weather: Arc::new(FixtureOverlaySource),
            air_quality: Arc::new(FixtureOverlaySource),
            solar: Arc::new(FixtureOverlaySource),
        },
    };
    let options = ExplorerOptions {
        discovery: settings.discovery()?,
        initial_position: None,
        enabled_overlays: Vec::new(),
    };
    let mut engine = ExplorerEngine::new(ports, options);

    let published = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&published);
    engine.on_session_complete(Box::new(move |outcome: &DiscoveryOutcome| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(outcome.clone());
        }
    }));

    engine.start_drawing()?;
    engine.complete_rectangle(bounds);
    let events = engine.run_until_idle().await;
    info!(events = events.len(), "discovery finished");

    let outcome = published
        .lock()
        .map_err(|_| eyre!("session listener panicked"))?
        .take()
        .ok_or_else(|| eyre!("discovery session did not publish"))?;
    let report = DiscoveryReport {
        summary: outcome.summary(),
        outcome: &outcome,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn overlays(
    settings: &ExplorerSettings,
    lat: Option<f64>,
    lon: Option<f64>,
    disabled: &[OverlayKind],
) -> Result<()> {
    let position = match (lat, lon) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon)?,
        _ => settings.initial_position()?,
    };
    let timeout = settings.request_timeout();
    let weather = WeatherHttpSource::new(
        settings.weather_endpoint()?,
        settings.weather_api_key()?,
        timeout,
    )
    .wrap_err("failed to build weather client")?;
    let air_quality =
        AirQualityHttpSource::new(settings.air_quality_endpoint()?, settings.api_key()?, timeout)
            .wrap_err("failed to build air quality client")?;
    let solar = SolarHttpSource::new(settings.solar_endpoint()?, settings.api_key()?, timeout)
        .wrap_err("failed to build solar client")?;

    let ports = ExplorerPorts {
        surface: Arc::new(HeadlessDrawingSurface),
        poi_source: Arc::new(FixturePoiSource),
        overlays: OverlaySources {
            weather: Arc::new(weather),
            air_quality: Arc::new(air_quality),
            solar: Arc::new(solar),
        },
    };
    let options = ExplorerOptions {
        initial_position: Some(position),
        enabled_overlays: OverlayKind::ALL
            .into_iter()
            .filter(|kind| !disabled.contains(kind))
            .collect(),
        ..ExplorerOptions::default()
    };
    let mut engine = ExplorerEngine::new(ports, options);
    engine.run_until_idle().await;

    let synchronizer = engine.overlays();
    for kind in OverlayKind::ALL {
        let failures = synchronizer.failure_count(kind);
        if failures > 0 {
            warn!(%kind, failures, "overlay fetch failed");
        }
    }
    let report = OverlayReport {
        position,
        weather: synchronizer.weather(),
        air_quality: synchronizer.air_quality(),
        solar: synchronizer.solar(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Argument parsing for the command-line driver.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn overlays_accepts_negative_coordinates_and_disabled_kinds() {
        let args = CliArgs::try_parse_from([
            "area-explorer",
            "overlays",
            "--lat",
            "-33.87",
            "--lon",
            "151.21",
            "--disable",
            "air-quality",
        ])
        .expect("arguments parse");

        let Command::Overlays { lat, lon, disabled } = args.command else {
            panic!("expected the overlays command");
        };
        assert_eq!((lat, lon), (Some(-33.87), Some(151.21)));
        assert_eq!(disabled, vec![OverlayKind::AirQuality]);
    }

    #[rstest]
    fn overlays_requires_both_coordinates() {
        let result = CliArgs::try_parse_from(["area-explorer", "overlays", "--lat", "10.0"]);
        assert!(result.is_err());
    }

    #[rstest]
    fn settings_load_through_the_config_trait() {
        let _guard = env_lock::lock_env([("EXPLORER_API_KEY", Some("cli-key"))]);

        let settings = ExplorerSettings::load_from_iter([OsString::from("area-explorer")])
            .expect("settings load");
        assert_eq!(settings.api_key(), Ok("cli-key"));
    }
}
