//! CLI command definitions and parsing
use crate::enrich::DetectorStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nfenrich",
    version,
    author = "neur0map",
    about = "Enriches Nextflow task log lines with side-channel workflow metadata",
    long_about = "nfenrich sits between a log shipper and log storage. Nextflow tasks emit one \
                  metadata-carrying record per output file ahead of their log lines; nfenrich \
                  absorbs those records and stamps every following line from the same file with \
                  the stored fields, a stream classification and a provenance tag, so storage \
                  can be queried by workflow, run, sample or job instead of raw text."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/nfenrich/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the enrichment pipeline over NDJSON records (stdin to stdout)
    Run {
        /// Override the registry capacity bound
        #[arg(long)]
        capacity: Option<usize>,

        /// Override the detection strategy ("flag" or "inline-json")
        #[arg(short, long)]
        strategy: Option<DetectorStrategy>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the global config path)
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
