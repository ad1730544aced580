//! Configuration loading for the scoring service endpoint.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use korekto_core::EndpointConfig;

pub const CONFIG_FILE_NAME: &str = "korekto.toml";

/// Top-level korekto configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KorektoConfig {
    /// The scoring service the operator talks to.
    #[serde(default)]
    pub service: EndpointConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted literally and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `korekto.toml` in the current directory
/// 2. `~/.config/korekto/config.toml`
///
/// Environment variable overrides: `KOREKTO_ENDPOINT`, `KOREKTO_TIMEOUT`,
/// `KOREKTO_USER`, `KOREKTO_PASSWORD`.
pub fn load_config() -> Result<KorektoConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<KorektoConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => default_config_paths().into_iter().find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => KorektoConfig::default(),
    };

    apply_overrides(&mut config.service, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Parse a TOML document and expand `${VAR}` references in its strings.
pub fn parse_config(content: &str) -> Result<KorektoConfig> {
    let mut config: KorektoConfig = toml::from_str(content)?;
    let service = &mut config.service;
    service.endpoint = resolve_env_vars(&service.endpoint);
    service.user = resolve_env_vars(&service.user);
    service.password = resolve_env_vars(&service.password);
    Ok(config)
}

/// Apply `KOREKTO_*` overrides, looked up through `lookup`.
fn apply_overrides<F>(service: &mut EndpointConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = lookup("KOREKTO_ENDPOINT") {
        service.endpoint = endpoint;
    }
    if let Some(timeout) = lookup("KOREKTO_TIMEOUT") {
        service.timeout = timeout
            .trim()
            .parse()
            .with_context(|| format!("KOREKTO_TIMEOUT is not a number of seconds: {timeout}"))?;
    }
    if let Some(user) = lookup("KOREKTO_USER") {
        service.user = user;
    }
    if let Some(password) = lookup("KOREKTO_PASSWORD") {
        service.password = password;
    }
    Ok(())
}

/// Check that the endpoint settings can actually be used for a call.
pub fn validate_endpoint_config(service: &EndpointConfig) -> Result<()> {
    if service.endpoint.trim().is_empty() {
        anyhow::bail!(
            "no scoring service endpoint configured (set service.endpoint or KOREKTO_ENDPOINT)"
        );
    }
    let url = reqwest::Url::parse(&service.endpoint)
        .with_context(|| format!("invalid endpoint URL: {}", service.endpoint))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("endpoint must be an http(s) URL, got scheme '{}'", url.scheme());
    }
    if service.timeout == 0 {
        anyhow::bail!("timeout must be at least one second");
    }
    if service.user.is_empty() {
        tracing::warn!("no basic-auth user configured, requests will send an empty user name");
    }
    Ok(())
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(home) = dirs_path() {
        paths.push(home.join("config.toml"));
    }
    paths
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("korekto"))
}
