//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Auto-paginating client for Marker/NextToken list operations
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Region substituted into service endpoints
    #[arg(short, long, global = true)]
    pub region: Option<String>,

    /// Send requests to this endpoint instead of the service default
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Additional service definition files (YAML)
    #[arg(long = "services", global = true)]
    pub services: Vec<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a listing operation, following continuation tokens
    List {
        /// Service name (e.g. elasticache)
        service: String,

        /// Operation name or API action (e.g. describe-cache-clusters)
        operation: String,

        /// Filter value, repeatable
        #[arg(short = 'f', long = "filter", value_name = "NAME=VALUE")]
        filters: Vec<String>,

        /// Resume from a token printed by an earlier manual run
        #[arg(long)]
        starting_token: Option<String>,

        /// Stop requesting pages once this many items were printed
        #[arg(long)]
        max_items: Option<u64>,

        /// Items to request per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Fetch a single page and print the next token to stderr
        #[arg(long)]
        no_auto_iteration: bool,
    },

    /// List services, or the operations of one service
    Operations {
        /// Service name
        service: Option<String>,
    },

    /// Show an operation definition
    Describe {
        /// Service name
        service: String,

        /// Operation name or API action
        operation: String,
    },

    /// Validate a service definition file
    Validate {
        /// Definition file (YAML)
        file: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Indented JSON
    Pretty,
}
