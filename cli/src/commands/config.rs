// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use humantime_serde::re::humantime::format_duration;
use std::path::PathBuf;

use neuroswarm_core::domain::config::{RegistryConfig, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./neuroswarm-config.yaml")]
        output: PathBuf,

        /// Include comments describing every field
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = RegistryConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./neuroswarm-config.yaml");
        println!("  4. ~/.neuroswarm/config.yaml");
        println!("  5. /etc/neuroswarm/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Registry:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    let protocol = &config.spec.protocol;
    println!("{}", "Protocol:".bold());
    println!("  Heartbeat interval: {}", format_duration(protocol.heartbeat_interval));
    println!("  Registration timeout: {}", format_duration(protocol.registration_timeout));
    println!("  Discovery cache TTL: {}", format_duration(protocol.discovery_cache_ttl));
    println!("  Max agents per swarm: {}", protocol.max_agents_per_swarm);
    println!("  Initial reputation: {}", protocol.min_reputation);
    println!();

    let discovery = &config.spec.discovery;
    println!("{}", "Discovery:".bold());
    println!("  Query timeout: {}", format_duration(discovery.query_timeout));
    println!(
        "  Cache: {}",
        if discovery.cache_enabled { "enabled".green() } else { "disabled".yellow() }
    );
    println!();

    println!("{}", "Events:".bold());
    println!("  Bus capacity: {}", config.spec.events.capacity);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = RegistryConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample).with_context(|| format!("Failed to write config to {:?}", output))?;

    println!("{}", format!("✓ Configuration generated: {}", output.display()).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse_and_validate() {
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let config = RegistryConfig::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_writes_a_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuroswarm-config.yaml");

        generate(path.clone(), false).await.unwrap();

        let config = RegistryConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(config.metadata.name, "local-registry");
        assert_eq!(config.spec.protocol.heartbeat_interval, std::time::Duration::from_secs(30));
    }
}
