// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config_cmd;
mod index_cmd;

use std::path::PathBuf;

use clap::Parser;

pub(super) use self::{config_cmd::ConfigCommands, index_cmd::IndexCommands};

/// Offline maintenance of an archive library. Never talks to the network.
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), bin_name = "archive-library", version, about)]
pub struct Cli {
    /// A TOML file containing the library configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Inspect or edit the archive index
    #[command(subcommand)]
    Index(IndexCommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}
