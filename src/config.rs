use std::time::Duration;

use anyhow::Result;
use clap_serde_derive::ClapSerde;

#[derive(ClapSerde, Debug, Clone)]
pub struct Config {
    /// The address the listener binds to
    #[default("0.0.0.0".to_string())]
    #[arg(short, long, env)]
    pub address: String,

    /// The port the listener binds to
    #[default(3000)]
    #[arg(short, long, env)]
    pub port: u16,

    /// Completion endpoint of the text-generation backend
    #[default("http://localhost:8080/completion".to_string())]
    #[arg(long, env)]
    pub llm_api_url: String,

    /// Key callers must present in the Authorization header; empty refuses every caller
    #[default(String::new())]
    #[arg(long, env, hide_env_values = true)]
    pub api_key: String,

    /// Timeout in seconds for generation calls to the backend
    #[default(300)]
    #[arg(long, env)]
    pub generation_timeout_secs: u64,

    /// Timeout in milliseconds for the backend liveness probe
    #[default(1000)]
    #[arg(long, env)]
    pub probe_timeout_ms: u64,

    /// OTLP collector endpoint; empty disables the exporter
    #[default(String::new())]
    #[arg(long, env)]
    pub otlp_endpoint: String,

    /// Log to the console as well when exporting to an OTLP collector
    #[default(true)]
    #[arg(long, env)]
    pub log_console: bool,
}

impl Config {
    /// Reads a TOML file. Keys the file leaves out keep their defaults.
    pub fn from_toml(path: &str) -> Result<Self> {
        let str = std::fs::read_to_string(path)?;
        Self::parse_toml(&str)
    }

    pub fn parse_toml(str: &str) -> Result<Self> {
        let opt: <Self as ClapSerde>::Opt = toml::from_str(str)?;
        Ok(Self::from(opt))
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        Some(self.otlp_endpoint.as_str()).filter(|endpoint| !endpoint.is_empty())
    }
}
