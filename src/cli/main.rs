// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use anyhow::Context as _;
use clap::Parser;
use tracing::{debug, info};

use super::subcommands::{Cli, Subcommand};
use crate::cli_shared::{cli::ConfigPath, logger, read_config};

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { config, cmd } = Cli::parse_from(args);

    let (path, config) = read_config(config.as_ref()).context("Error parsing config")?;
    logger::setup_logger(&config.log);
    match &path {
        Some(ConfigPath::Env(path)) => info!("ARCHIVE_LIBRARY_CONFIG loaded: {}", path.display()),
        Some(ConfigPath::Project(path)) => info!("Project config loaded: {}", path.display()),
        Some(ConfigPath::Cli(path)) => debug!("Config loaded: {}", path.display()),
        None => debug!("Using default config"),
    }

    let mut stdout = std::io::stdout();
    match cmd {
        Subcommand::Index(cmd) => cmd.run(&config, &mut stdout),
        Subcommand::Config(cmd) => cmd.run(&config, &mut stdout),
    }
}
