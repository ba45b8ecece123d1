// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `neuroswarm-core` - Agent Registration and Discovery
//!
//! Core of the NeuroSwarm agent protocol (v1.0.0): how autonomous agents
//! advertise capabilities, how their liveness and trust are tracked, and
//! how other parties find agents that meet a requirement set.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | records, lifecycle rules, queries, errors, config |
//! | [`application`] | Application | `RegistryService`, `DiscoveryService` |
//! | [`infrastructure`] | Infrastructure | in-memory store, Ed25519/SHA-256, clocks, cache, event bus |
//!
//! ## Control Flow
//!
//! ```text
//! RegistrationRequest ──▶ RegistryService ──▶ AgentRepository
//!                              │ events            ▲ snapshot
//!                              ▼                   │
//!                        DiscoveryCache ◀── DiscoveryService ◀── swarm coordinator
//! ```
//!
//! Swarm formation lives in the `neuroswarm-swarm` crate.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
