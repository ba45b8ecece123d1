// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure protocol types and rules. No I/O; collaborators are reached through
//! the traits in [`collaborators`], [`accounts`] and [`repository`].
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`agent`] | `AgentRecord`, `AgentMetadata`, `AgentStatus`, `AgentCategory` |
//! | [`capability`] | `CapabilityDescriptor`, `PerformanceMetrics` |
//! | [`registration`] | `RegistrationRequest`, schema validation |
//! | [`discovery`] | `DiscoveryQuery`, `DiscoveryResult` |
//! | [`swarm`] | `SwarmId`, `SwarmStatus` |
//! | [`events`] | `RegistryEvent`, `SwarmLifecycleEvent` |
//! | [`error`] | `ErrorKind`, `RegistryError`, `DiscoveryError` |

pub mod accounts;
pub mod agent;
pub mod capability;
pub mod collaborators;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod protocol;
pub mod registration;
pub mod repository;
pub mod swarm;
