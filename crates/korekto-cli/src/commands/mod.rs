pub mod batch;
pub mod check_config;
pub mod init;
pub mod score;

use std::path::Path;

use anyhow::{Context, Result};

use korekto_client::{load_config_from, validate_endpoint_config, HttpTransport};
use korekto_core::{EndpointConfig, ScoringOperator};

/// Output formats shared by the scoring commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unknown format: {other} (expected text or json)"),
        }
    }
}

/// Load and validate the endpoint settings, then build an HTTP-backed operator.
pub fn connect(
    config_path: Option<&Path>,
) -> Result<(ScoringOperator<HttpTransport>, EndpointConfig)> {
    let config = load_config_from(config_path)?;
    validate_endpoint_config(&config.service)?;
    let transport = HttpTransport::new().context("failed to build HTTP client")?;
    Ok((ScoringOperator::new(transport), config.service))
}
