//! CLI argument parsing for flux-reconcile

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "flux-reconcile")]
#[command(author, version, about = "Request a source reconciliation and wait for it", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Namespace of the source (default: flux-system)
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// How long to wait for the reconciliation, e.g. 90s or 5m
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// How often to check the source status
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// YAML file with the Bucket and GitRepository objects to serve
    #[arg(short, long, required = true)]
    pub manifest: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile a source
    Source {
        #[command(subcommand)]
        kind: SourceCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SourceCommand {
    /// Reconcile a Bucket source
    Bucket {
        #[arg(required = true)]
        name: String,
    },

    /// Reconcile a GitRepository source
    Git {
        #[arg(required = true)]
        name: String,
    },
}
