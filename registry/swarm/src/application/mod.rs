// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod coordinator;
pub mod cost;

pub use coordinator::{select_agents, Selection, StandardSwarmCoordinator, SwarmService};
pub use cost::{CostFunction, DeclaredResourceCost, FlatCost};
