//! atcmix - command-line front end
//!
//! Queries the catalog API for stations and sources, and runs a simulated
//! mixer session for exercising the engine without a platform audio host.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atcmix_engine::catalog::CatalogClient;
use atcmix_engine::mixer::{AudioHost, ChannelId, MixerEngine, SimHost};

/// Command-line arguments for atcmix
#[derive(Parser, Debug)]
#[command(name = "atcmix")]
#[command(about = "Dual-channel ATC/music stream mixer")]
#[command(version)]
struct Args {
    /// Base URL of the catalog API
    #[arg(
        long,
        default_value = "http://localhost:3000/api",
        env = "ATCMIX_API_BASE"
    )]
    api_base: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List ATC stations
    Stations,

    /// List music sources
    Sources,

    /// Probe the catalog API health endpoint
    Health,

    /// Resolve a third-party video URL to a direct audio stream
    Extract {
        /// Video URL to resolve
        url: String,
    },

    /// Run a simulated mixer session (no platform audio required)
    Demo {
        /// Crossfade duration in seconds
        #[arg(long, default_value_t = 0.5)]
        fade: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atcmix=info,atcmix_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let catalog = CatalogClient::new(args.api_base.clone());

    match args.command {
        Command::Stations => {
            let stations = catalog
                .atc_stations()
                .await
                .context("Failed to fetch ATC stations")?;
            for station in stations {
                println!(
                    "{:10} {:8} {:>8}  {}",
                    station.id, station.airport_code, station.frequency, station.name
                );
            }
        }

        Command::Sources => {
            let sources = catalog
                .music_sources()
                .await
                .context("Failed to fetch music sources")?;
            for source in sources {
                println!("{:10} [{}] {}", source.id, source.source_type, source.name);
            }
        }

        Command::Health => {
            let healthy = catalog.health().await.context("Health check failed")?;
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
        }

        Command::Extract { url } => {
            let info = catalog
                .extract_youtube(&url)
                .await
                .context("Stream extraction failed")?;
            println!("{}\n{}", info.title, info.stream_url);
        }

        Command::Demo { fade } => run_demo(fade).await?,
    }

    Ok(())
}

/// Drive a full engine session against the simulated host, printing gain
/// readings while a crossfade runs.
async fn run_demo(fade: f64) -> Result<()> {
    let host = Arc::new(SimHost::new());
    let engine = MixerEngine::new(host as Arc<dyn AudioHost>);

    engine
        .play_atc("https://d.liveatc.net/kjfk_twr")
        .await
        .context("ATC playback failed")?;
    engine
        .play_music("https://example.com/lofi")
        .await
        .context("Music playback failed")?;

    info!(
        atc = engine.get_atc_volume().await,
        music = engine.get_music_volume().await,
        "both channels playing"
    );

    let handle = engine
        .switch_atc_station("https://d.liveatc.net/ksfo_twr", Some(fade))
        .await;

    // Sample the ATC gain stage while the fade runs
    let steps = 8;
    for _ in 0..steps {
        tokio::time::sleep(Duration::from_secs_f64(fade / steps as f64)).await;
        if let (Some(t), Some(level)) = (
            engine.clock_now().await,
            engine.channel_level(ChannelId::Atc).await,
        ) {
            println!("t={t:6.3}s  atc gain={level:.3}");
        }
    }

    handle.finished().await.context("Crossfade failed")?;
    info!("crossfade complete");

    engine.pause().await;
    info!(paused = engine.is_paused().await, "paused");
    engine.resume().await.context("Resume failed")?;
    info!(paused = engine.is_paused().await, "resumed");

    engine.destroy().await;
    info!("engine destroyed");
    Ok(())
}
