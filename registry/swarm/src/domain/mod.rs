// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod error;
pub mod formation;
pub mod repository;
