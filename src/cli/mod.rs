//! CLI module - Command-line interface for adserve

mod commands;

use clap::{Parser, Subcommand};

/// adserve - ad targeting service
/// Admits ads and serves targeted, cached searches over HTTP
#[derive(Parser)]
#[command(name = "adserve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C
    #[command(alias = "daemon", short_flag = 'd')]
    Serve,

    /// Create default config file
    Init,

    /// Connect to the database and report its state
    #[command(short_flag = 'c')]
    Check,

    /// Drop every cached search result
    #[command(alias = "flush")]
    FlushCache,
}

pub use commands::*;
