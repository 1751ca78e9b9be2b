// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write;

use anyhow::Context as _;
use clap::Subcommand;
use tracing::{info, warn};

use crate::cli_shared::cli::Config;
use crate::db::IndexBackend;
use crate::library::{ArchiveIndex, Error};

#[derive(Debug, Subcommand)]
pub enum IndexCommands {
    /// Print every archive in the library
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an archive from the library without touching its storage
    Forget {
        /// URL the archive was recorded under
        url: String,
    },
}

impl IndexCommands {
    pub fn run<W: Write>(self, config: &Config, sink: &mut W) -> anyhow::Result<()> {
        let index = open_index(config)?;
        match self {
            Self::List { json } => {
                let records = index.list()?;
                if json {
                    serde_json::to_writer_pretty(&mut *sink, &records)?;
                    writeln!(sink)?;
                } else {
                    for record in records {
                        writeln!(
                            sink,
                            "{}\t{}\t{}",
                            record.url,
                            if record.owner { "owned" } else { "-" },
                            record.title.as_deref().unwrap_or_default()
                        )?;
                    }
                }
                Ok(())
            }
            Self::Forget { url } => {
                if index.get(&url)?.is_none() {
                    return Err(Error::NotInLibrary(url).into());
                }
                index.delete(&url)?;
                info!("Forgot {url}");
                Ok(())
            }
        }
    }
}

fn open_index(config: &Config) -> anyhow::Result<ArchiveIndex> {
    let library = &config.library;
    if library.index_backend == IndexBackend::Memory {
        warn!("The in-memory index backend starts empty on every run");
    }
    let path = library.index_path();
    ArchiveIndex::open(library.index_backend, &path)
        .with_context(|| format!("failed to open the index in {}", path.display()))
}
