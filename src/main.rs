use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{ApiKey, Settings};
use dotenvy::dotenv;
use render::map::render_map;
use services::{directions_client::GoogleDirectionsClient, fetch_job::run_fetch_jobs};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

mod config;
mod dal;
mod model;
mod render;
mod services;
mod utils;

/// Transit travel times from a grid of origins to fixed destinations, drawn on a map
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the directions API for every origin and save the result documents
    Fetch {
        /// Run only this job (airport, hbf, hbf-bike)
        job: Option<String>,
    },
    /// Build the HTML map from the saved result documents
    Render,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let cli = Cli::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily("./logs", "transit_reach_map.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();
    let stdout_log = tracing_subscriber::fmt::layer().compact();

    Registry::default()
        .with(stdout_log)
        .with(file_log)
        .with(env_filter)
        .init();

    let settings = Settings::munich()?;

    match cli.command {
        Command::Fetch { job } => {
            let api_key = ApiKey::from_env()?;
            let client = GoogleDirectionsClient::new(api_key);
            run_fetch_jobs(&settings, client, job.as_deref()).await?;
            info!("Fetching done");
        }
        Command::Render => render_map(&settings.render)?,
    }

    Ok(())
}
