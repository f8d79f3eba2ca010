//! Configuration CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::config::{Config, DEFAULT_API_URL};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Set the service base URL in the global config file
    SetUrl {
        /// Base URL, e.g. http://localhost:8080
        url: String,
    },
}

pub fn run(cmd: ConfigCommands, config: &Config, effective_url: &str, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(output, config, effective_url),
        ConfigCommands::SetUrl { url } => set_url(output, &url),
    }
}

fn show(output: &Output, config: &Config, effective_url: &str) -> Result<()> {
    let path = Config::config_path();

    if output.is_json() {
        output.data(&serde_json::json!({
            "api_url": effective_url,
            "file_url": config.api_url,
            "default_url": DEFAULT_API_URL,
            "config_file": path.as_ref().map(|p| p.display().to_string()),
        }));
    } else {
        println!("API URL: {}", effective_url);
        match &path {
            Some(p) if p.exists() => println!("Config file: {}", p.display()),
            Some(p) => println!("Config file: {} (not created yet)", p.display()),
            None => println!("Config file: unavailable"),
        }
        if effective_url != config.api_url {
            println!("File value: {}", config.api_url);
        }
    }

    Ok(())
}

fn set_url(output: &Output, url: &str) -> Result<()> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("URL must start with http:// or https://");
    }

    let config = Config {
        api_url: url.trim_end_matches('/').to_string(),
    };
    config.save()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "api_url": config.api_url }));
    } else {
        output.success(&format!("Set API URL to {}", config.api_url));
    }

    Ok(())
}
