//! confload demo - loads a sample configuration and prints it

use anyhow::{Context, Result};
use clap::Parser;
use confload::{load, set_output_format, OutputFormat, Settings};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod demo;

use demo::{EnvConf, YamlConf};

/// Load, validate and print a sample configuration
#[derive(Debug, Parser)]
#[command(name = "confload-demo", version)]
struct Args {
    /// Output format for the printed configuration
    #[arg(long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Read the configuration from this YAML file instead of the environment
    #[arg(long)]
    yaml: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_result = dotenv::dotenv();

    init_logging()?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Could not load .env file: {}", e),
    }

    let args = Args::parse();
    set_output_format(args.format);

    match args.yaml {
        Some(path) => {
            let mut settings = Settings::<YamlConf>::from_yaml(&path);
            load(&mut [&mut settings])
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

            let config = settings.get();
            info!("Loaded configuration for: {}", config.app_name);
            info!("Server will run on port: {}", config.port);
        }
        None => {
            let mut settings = Settings::<EnvConf>::from_env();
            load(&mut [&mut settings]).context("Failed to load configuration from environment")?;

            info!(name = %settings.get().name, "configuration successfully loaded");
        }
    }

    Ok(())
}

/// Initialize logging based on environment variables
fn init_logging() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so printed configuration owns stdout
    match log_format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    Ok(())
}
