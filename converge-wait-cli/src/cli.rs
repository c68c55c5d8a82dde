use clap::{Args, Parser, Subcommand};
use std::time::Duration;

/// Block until an asynchronous AWS Directory Service operation has observably completed.
#[derive(Debug, Parser)]
#[command(name = "converge-wait", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Give up after this many seconds
    #[arg(
        long,
        global = true,
        env = "CONVERGE_WAIT_TIMEOUT",
        default_value_t = 600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Wait for a newly added region to become Active
    RegionCreated(RegionArgs),
    /// Wait for a removed region to disappear
    RegionDeleted(RegionArgs),
    /// Wait for a directory share to be deleted (owner side)
    ShareDeleted(ShareArgs),
    /// Wait for a directory shared into this account to reach Shared
    DirectoryShared(DirectoryArgs),
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegionCreated(_) => "region-created",
            Self::RegionDeleted(_) => "region-deleted",
            Self::ShareDeleted(_) => "share-deleted",
            Self::DirectoryShared(_) => "directory-shared",
        }
    }
}

#[derive(Debug, Args)]
pub struct RegionArgs {
    /// Directory identifier (d-xxxxxxxxxx)
    #[arg(long)]
    pub directory_id: String,
    /// Region the directory is replicated to
    #[arg(long)]
    pub region_name: String,
}

#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Directory identifier in the owner account
    #[arg(long)]
    pub owner_directory_id: String,
    /// Identifier of the shared directory in the consumer account
    #[arg(long)]
    pub shared_directory_id: String,
}

#[derive(Debug, Args)]
pub struct DirectoryArgs {
    /// Identifier of the directory shared into this account
    #[arg(long)]
    pub directory_id: String,
}
