// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `neuroswarm-swarm` - Swarm Formation
//!
//! Assembles coordinator-led swarms of registered agents that together cover
//! a capability requirement set, then tracks each swarm through its
//! explicit lifecycle. Agents are located through the `neuroswarm-core`
//! discovery service; formations only ever hold agent ids.
//!
//! - [`domain`]: formation aggregate, requests, lifecycle signals, errors
//! - [`application`]: `SwarmService` and the greedy selection it runs
//! - [`infrastructure`]: in-memory formation store

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{StandardSwarmCoordinator, SwarmService};
pub use domain::error::SwarmError;
pub use domain::formation::{Priority, SwarmConstraints, SwarmCoordinationRequest, SwarmFormation, SwarmSignal};
