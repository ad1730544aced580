//! The `korekto check-config` command.

use std::path::PathBuf;

use anyhow::Result;

use korekto_client::{load_config_from, validate_endpoint_config};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let service = &config.service;

    println!("Endpoint: {}", display_or_unset(&service.endpoint));
    println!("Score URL: {}", service.score_item_url());
    println!("Timeout: {}s", service.timeout);
    println!("User: {}", display_or_unset(&service.user));
    println!(
        "Password: {}",
        if service.password.is_empty() {
            "(not set)"
        } else {
            "***"
        }
    );

    validate_endpoint_config(service)?;
    println!("Configuration OK.");

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
