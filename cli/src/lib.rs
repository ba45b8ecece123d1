// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0
//! NeuroSwarm CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** operator commands over an embedded, in-memory registry

pub mod commands;
pub mod embedded;
pub mod fleet;
