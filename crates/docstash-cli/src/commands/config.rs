//! Config command handlers

use anyhow::{bail, Result};

use docstash_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        _ => {
            println!("Config file: {}", Config::config_file_path().display());
            println!();
            println!("data_dir         = {}", config.data_dir.display());
            println!(
                "remote_url       = {}",
                config.remote_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "auth_token       = {}",
                if config.auth_token.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!("poll_interval_ms = {}", config.poll_interval_ms);
        }
    }
    Ok(())
}

/// Set a configuration value and persist it
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load()?;

    match key.as_str() {
        "data_dir" => config.data_dir = value.clone().into(),
        "remote_url" => {
            config.remote_url = if value.is_empty() { None } else { Some(value.clone()) }
        }
        "auth_token" => {
            config.auth_token = if value.is_empty() { None } else { Some(value.clone()) }
        }
        "poll_interval_ms" => {
            config.poll_interval_ms = value
                .parse()
                .map_err(|_| anyhow::anyhow!("poll_interval_ms must be a number, got '{}'", value))?
        }
        other => bail!(
            "Unknown config key '{}'. Valid keys: data_dir, remote_url, auth_token, poll_interval_ms",
            other
        ),
    }

    config.save()?;
    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}
