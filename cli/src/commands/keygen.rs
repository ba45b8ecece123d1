// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Owner key generation

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use neuroswarm_core::infrastructure::crypto::{generate_signing_key, owner_key};

#[derive(Args)]
pub struct KeygenArgs {
    /// Write the secret key (hex) to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub async fn execute(args: KeygenArgs) -> Result<()> {
    let key = generate_signing_key();
    let secret = hex::encode(key.to_bytes());
    let owner = owner_key(&key);

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", secret))
                .with_context(|| format!("Failed to write secret key to {:?}", path))?;
            println!("{}", format!("✓ Secret key written: {}", path.display()).green());
        }
        None => {
            println!("{} {}", "Secret key:".bold(), secret);
            println!("{}", "Keep the secret key private; it signs every registration for this owner.".yellow());
        }
    }
    println!("{} {}", "Owner:".bold(), owner);

    Ok(())
}
