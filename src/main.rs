use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use clap_serde_derive::ClapSerde;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use llm_gateway::backend::HttpBackend;
use llm_gateway::config::Config;
use llm_gateway::telemetry::init_telemetry;
use llm_gateway::{build_router, AppState};

const DEFAULT_CONFIG_FILE: &str = "Gateway.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may be set up by other means.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(conf) => conf.merge(args.opt_config),
        Err(_) if args.config_file == DEFAULT_CONFIG_FILE => {
            Config::default().merge(args.opt_config)
        }
        Err(err) => {
            return Err(err.context(format!(
                "Failed to read configuration file {}",
                args.config_file
            )))
        }
    };

    init_telemetry(config.otlp_endpoint(), config.log_console)?;

    if config.api_key.is_empty() {
        warn!("No API key configured, every authenticated request will be refused");
    }

    let backend = HttpBackend::new(
        &config.llm_api_url,
        config.generation_timeout(),
        config.probe_timeout(),
    )
    .with_context(|| format!("Invalid LLM API URL {}", config.llm_api_url))?;
    info!("Checking LLM server on {}", backend.url());

    let listener = TcpListener::bind(format!("{}:{}", config.address, config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    let router = build_router(AppState::new(config, Arc::new(backend)));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down...");
}
