use anyhow::{bail, Result};
use clap::Parser;
use reqwest::Url;

use llm_gateway::handlers::health::{HealthResponse, LlmStatus};

/// Container health check: asks a running gateway for its health report.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Health endpoint of the gateway
    #[arg(default_value = "http://127.0.0.1:3000/health")]
    url: String,

    /// Also fail when the gateway reports its LLM backend offline
    #[arg(long)]
    require_llm: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let url = Url::parse(&args.url)?;

    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        bail!("Health request failed with status {}", response.status())
    }

    let report: HealthResponse = response.json()?;
    if args.require_llm && report.llm != LlmStatus::Online {
        bail!("LLM backend is offline")
    }

    Ok(())
}
