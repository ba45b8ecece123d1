// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # NeuroSwarm CLI
//!
//! The `neuroswarm` binary is the operator tool for the NeuroSwarm agent
//! protocol. It never talks to a remote registry: discovery and swarm
//! planning run against an embedded, in-memory registry loaded from a
//! fleet file.
//!
//! ## Commands
//!
//! - `neuroswarm config show|validate|generate` - Configuration management
//! - `neuroswarm keygen` - Generate an owner signing key
//! - `neuroswarm agent sign|discover|deps` - Registration requests and discovery
//! - `neuroswarm swarm plan` - Form a swarm from a fleet

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use neuroswarm_cli::commands::{self, AgentCommand, ConfigCommand, KeygenArgs, SwarmCommand};

/// NeuroSwarm - agent registration, discovery and swarm formation
#[derive(Parser)]
#[command(name = "neuroswarm")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "NEUROSWARM_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "NEUROSWARM_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, env = "NEUROSWARM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate an owner signing key
    #[command(name = "keygen")]
    Keygen(KeygenArgs),

    /// Registration requests and discovery
    #[command(name = "agent")]
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Swarm formation
    #[command(name = "swarm")]
    Swarm {
        #[command(subcommand)]
        command: SwarmCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        Some(Commands::Keygen(args)) => commands::keygen::execute(args).await,
        Some(Commands::Agent { command }) => commands::agent::handle_command(command, cli.config).await,
        Some(Commands::Swarm { command }) => commands::swarm::handle_command(command, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
