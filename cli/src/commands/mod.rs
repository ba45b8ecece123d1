// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the NeuroSwarm CLI

pub mod agent;
pub mod config;
pub mod keygen;
pub mod swarm;

pub use self::agent::AgentCommand;
pub use self::config::ConfigCommand;
pub use self::keygen::KeygenArgs;
pub use self::swarm::SwarmCommand;

use clap::ValueEnum;

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}
