// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod discovery;
pub mod registry;
pub mod wiring;

pub use discovery::{DependencyResolution, DiscoveryService, StandardDiscoveryService};
pub use registry::{Authorization, RegistryService, StandardRegistryService, SweepReport};
pub use wiring::{RegistryServices, RegistryServicesBuilder};
