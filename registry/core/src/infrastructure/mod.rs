// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod clock;
pub mod crypto;
pub mod discovery_cache;
pub mod event_bus;
pub mod repositories;
