// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent commands
//!
//! Commands: sign, discover, deps

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use neuroswarm_core::application::{DiscoveryService, RegistryService};
use neuroswarm_core::domain::agent::{AgentCategory, AgentMetadata, AgentRecord, AgentStatus};
use neuroswarm_core::domain::config::RegistryConfig;
use neuroswarm_core::domain::discovery::{DiscoveryQuery, ResourceRequirements};
use neuroswarm_core::infrastructure::crypto::{sign_metadata, signing_key_from_hex, Sha256CanonicalHasher};

use crate::commands::OutputFormat;
use crate::embedded::EmbeddedRegistry;
use crate::fleet::Fleet;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Sign agent metadata and print the registration request (JSON)
    Sign {
        /// Path to agent metadata (YAML or JSON)
        #[arg(value_name = "METADATA")]
        metadata: PathBuf,

        /// Owner secret key (hex)
        #[arg(long, env = "NEUROSWARM_SECRET_KEY", hide_env_values = true)]
        secret_key: String,

        /// Write the request to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Load a fleet into an embedded registry and run a discovery query
    Discover {
        #[command(flatten)]
        filters: DiscoverFilters,

        /// Fleet file to load
        #[arg(long, value_name = "FLEET")]
        fleet: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Resolve an agent's declared dependencies against a fleet
    Deps {
        /// Agent name as it appears in the fleet
        #[arg(value_name = "NAME")]
        name: String,

        /// Fleet file to load
        #[arg(long, value_name = "FLEET")]
        fleet: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct DiscoverFilters {
    /// Required capability id (repeatable; all must be present)
    #[arg(long = "capability", value_name = "ID")]
    capabilities: Vec<String>,

    /// Accepted category (repeatable; any may match)
    #[arg(long = "category", value_name = "CATEGORY")]
    categories: Vec<AgentCategory>,

    /// Owner public key (hex)
    #[arg(long)]
    owner: Option<String>,

    /// Exact status (default: every status except suspended and deprecated)
    #[arg(long)]
    status: Option<AgentStatus>,

    #[arg(long, value_name = "0..1")]
    min_reputation: Option<f64>,

    /// Maximum capability latency in milliseconds
    #[arg(long, value_name = "MS")]
    max_latency: Option<f64>,

    /// Preferred location; matching agents are listed first
    #[arg(long)]
    location: Option<String>,

    #[arg(long, value_name = "CORES")]
    min_cpu: Option<f64>,

    #[arg(long, value_name = "MB")]
    min_memory: Option<f64>,
}

impl DiscoverFilters {
    pub fn to_query(&self) -> DiscoveryQuery {
        let mut query = DiscoveryQuery::new();
        if !self.capabilities.is_empty() {
            query = query.with_capabilities(self.capabilities.iter().cloned());
        }
        if !self.categories.is_empty() {
            query = query.with_categories(self.categories.iter().copied());
        }
        if let Some(owner) = &self.owner {
            query = query.with_owner(owner.clone());
        }
        if let Some(status) = self.status {
            query = query.with_status(status);
        }
        if let Some(min) = self.min_reputation {
            query = query.with_min_reputation(min);
        }
        if let Some(max) = self.max_latency {
            query = query.with_max_latency(max);
        }
        if let Some(location) = &self.location {
            query = query.with_location(location.clone());
        }
        if self.min_cpu.is_some() || self.min_memory.is_some() {
            query = query.with_resources(ResourceRequirements {
                cpu_cores: self.min_cpu,
                memory_mb: self.min_memory,
                ..ResourceRequirements::default()
            });
        }
        query
    }
}

pub async fn handle_command(command: AgentCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        AgentCommand::Sign {
            metadata,
            secret_key,
            output,
        } => sign(metadata, &secret_key, output).await,
        AgentCommand::Discover { filters, fleet, format } => {
            let embedded = load(config_path, &fleet).await?;
            discover(&embedded, &filters, format).await
        }
        AgentCommand::Deps { name, fleet } => {
            let embedded = load(config_path, &fleet).await?;
            deps(&embedded, &name).await
        }
    }
}

/// Embedded registry with `fleet` loaded.
pub async fn load(config_path: Option<PathBuf>, fleet: &Path) -> Result<EmbeddedRegistry> {
    let config = RegistryConfig::load_or_default(config_path).context("Failed to load configuration")?;
    load_with(EmbeddedRegistry::new(&config)?, fleet).await
}

pub async fn load_with(embedded: EmbeddedRegistry, fleet: &Path) -> Result<EmbeddedRegistry> {
    let fleet = Fleet::from_file(fleet)?;
    let loaded = embedded.load_fleet(&fleet).await?;
    eprintln!(
        "{}",
        format!("Loaded {} of {} fleet agents", loaded.len(), fleet.agents.len()).dimmed()
    );
    Ok(embedded)
}

async fn sign(metadata_path: PathBuf, secret_key: &str, output: Option<PathBuf>) -> Result<()> {
    let content = std::fs::read_to_string(&metadata_path)
        .with_context(|| format!("Failed to read metadata: {:?}", metadata_path))?;
    let metadata: AgentMetadata = serde_yaml::from_str(&content).context("Failed to parse agent metadata")?;

    let key = signing_key_from_hex(secret_key).context("Invalid secret key")?;
    let request = sign_metadata(metadata, &key, &Sha256CanonicalHasher)?;
    let json = serde_json::to_string_pretty(&request)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("Failed to write request to {:?}", path))?;
            println!(
                "{}",
                format!("✓ Signed registration for '{}': {}", request.metadata.name, path.display()).green()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn discover(embedded: &EmbeddedRegistry, filters: &DiscoverFilters, format: OutputFormat) -> Result<()> {
    let result = embedded
        .services
        .discovery
        .discover_with_timeout(filters.to_query(), embedded.services.query_timeout)
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&result)?),
        OutputFormat::Table => {
            if result.agents.is_empty() {
                println!("{}", "No agents found".yellow());
                return Ok(());
            }
            println!("{} agents found:", result.total_count);
            print_agents(&result.agents);
        }
    }
    Ok(())
}

async fn deps(embedded: &EmbeddedRegistry, name: &str) -> Result<()> {
    let agent = find_by_name(embedded, name).await?;
    let resolution = embedded.services.discovery.resolve_dependencies(agent.id).await?;

    if resolution.resolved.is_empty() && resolution.unresolved.is_empty() {
        println!("{}", format!("'{}' declares no dependencies", name).dimmed());
        return Ok(());
    }
    for (dependency, providers) in &resolution.resolved {
        let names = futures::future::try_join_all(
            providers
                .iter()
                .map(|id| embedded.services.registry.get(*id)),
        )
        .await?
        .into_iter()
        .map(|a| a.name)
        .collect::<Vec<_>>();
        println!("  {} {} → {}", "✓".green(), dependency.bold(), names.join(", "));
    }
    for dependency in &resolution.unresolved {
        println!("  {} {} {}", "✗".red(), dependency.bold(), "(no active provider)".dimmed());
    }
    if !resolution.is_complete() {
        anyhow::bail!("{} unresolved dependencies", resolution.unresolved.len());
    }
    Ok(())
}

async fn find_by_name(embedded: &EmbeddedRegistry, name: &str) -> Result<AgentRecord> {
    let everyone = embedded
        .services
        .discovery
        .discover(DiscoveryQuery::new())
        .await?;
    everyone
        .agents
        .into_iter()
        .find(|a| a.name == name)
        .ok_or_else(|| anyhow::anyhow!("Agent '{}' not found in fleet", name))
}

pub fn print_agents(agents: &[AgentRecord]) {
    println!(
        "{:<38} {:<20} {:<10} {:<10} {:<6} {}",
        "ID", "NAME", "VERSION", "STATUS", "REP", "CAPABILITIES"
    );
    for agent in agents {
        println!(
            "{:<38} {:<20} {:<10} {:<10} {:<6.2} {}",
            agent.id,
            agent.name.bold(),
            agent.version,
            agent.status,
            agent.reputation(),
            agent.capability_ids().collect::<Vec<_>>().join(",")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_build_an_empty_query() {
        assert_eq!(DiscoverFilters::default().to_query(), DiscoveryQuery::new());
    }

    #[test]
    fn test_resource_filters_build_requirements() {
        let filters = DiscoverFilters {
            min_memory: Some(4096.0),
            status: Some(AgentStatus::Active),
            ..DiscoverFilters::default()
        };
        let query = filters.to_query();
        assert_eq!(query.status, Some(AgentStatus::Active));
        let resources = query.available_resources.unwrap();
        assert_eq!(resources.memory_mb, Some(4096.0));
        assert_eq!(resources.cpu_cores, None);
    }
}
