// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Swarm commands
//!
//! Commands: plan

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use neuroswarm_core::application::RegistryService;
use neuroswarm_core::domain::config::RegistryConfig;
use neuroswarm_core::domain::swarm::SwarmId;
use neuroswarm_swarm::application::{CostFunction, DeclaredResourceCost, FlatCost};
use neuroswarm_swarm::{Priority, SwarmConstraints, SwarmCoordinationRequest, SwarmFormation, SwarmService};

use crate::commands::agent::{load_with, print_agents};
use crate::commands::OutputFormat;
use crate::embedded::EmbeddedRegistry;

#[derive(Subcommand)]
pub enum SwarmCommand {
    /// Load a fleet into an embedded registry and form a swarm from it
    Plan {
        /// Fleet file to load
        #[arg(long, value_name = "FLEET")]
        fleet: PathBuf,

        /// Required capability id (repeatable)
        #[arg(long = "require", value_name = "ID", required = true)]
        required: Vec<String>,

        /// Task description recorded on the formation
        #[arg(long, default_value = "")]
        task: String,

        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Swarm id (generated when omitted)
        #[arg(long)]
        swarm_id: Option<String>,

        /// Coordinator plus participants
        #[arg(long)]
        max_agents: Option<usize>,

        #[arg(long, value_name = "0..1")]
        min_reputation: Option<f64>,

        /// Maximum capability latency in milliseconds
        #[arg(long, value_name = "MS")]
        max_latency: Option<f64>,

        /// Upper bound on the summed agent cost
        #[arg(long)]
        budget: Option<f64>,

        /// Price agents per declared CPU core instead of a flat 1.0 each
        #[arg(long, value_name = "PRICE")]
        price_per_core: Option<f64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

pub async fn handle_command(command: SwarmCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        SwarmCommand::Plan {
            fleet,
            required,
            task,
            priority,
            swarm_id,
            max_agents,
            min_reputation,
            max_latency,
            budget,
            price_per_core,
            format,
        } => {
            let cost: Arc<dyn CostFunction> = match price_per_core {
                Some(per_cpu_core) => Arc::new(DeclaredResourceCost {
                    per_cpu_core,
                    ..DeclaredResourceCost::default()
                }),
                None => Arc::new(FlatCost::default()),
            };
            let config = RegistryConfig::load_or_default(config_path).context("Failed to load configuration")?;
            let embedded = load_with(EmbeddedRegistry::with_cost(&config, cost)?, &fleet).await?;

            let mut request = SwarmCoordinationRequest::new(required)
                .with_task(task)
                .with_priority(priority)
                .with_constraints(SwarmConstraints {
                    max_agents,
                    min_reputation,
                    max_latency,
                    budget,
                });
            if let Some(id) = swarm_id {
                request = request.with_swarm_id(SwarmId(id));
            }

            let formation = embedded.swarms.form_swarm(request).await?;
            print_formation(&embedded, &formation, format).await
        }
    }
}

async fn print_formation(embedded: &EmbeddedRegistry, formation: &SwarmFormation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(formation)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(formation)?),
        OutputFormat::Table => {
            let registry = embedded.services.registry.as_ref();
            let mut members = Vec::with_capacity(formation.size());
            for id in formation.members() {
                members.push(registry.get(id).await?);
            }

            println!("{}", format!("✓ Swarm {} formed", formation.id).green());
            if !formation.task.is_empty() {
                println!("  Task: {}", formation.task);
            }
            println!("  Priority: {}", formation.priority);
            println!("  Coordinator: {}", members[0].name.bold());
            println!(
                "  Capabilities: {}",
                formation
                    .capabilities
                    .iter()
                    .map(|c| c.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!();
            print_agents(&members);
        }
    }
    Ok(())
}
