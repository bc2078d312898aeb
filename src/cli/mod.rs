//! CLI module for the dataset query gateway
//!
//! - `serve`: HTTP API server
//! - `import`: load datasets from a JSON document into the configured catalog

pub mod import;
pub mod serve;

use clap::{Parser, Subcommand};

/// Dataset Query Gateway - natural-language queries over a dataset catalog
#[derive(Parser)]
#[command(name = "dataset-query-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Import datasets and samples from a JSON file
    Import(import::ImportArgs),
}
