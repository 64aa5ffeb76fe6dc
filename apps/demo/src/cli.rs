use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "demo",
    about = "Screen-broadcast demo session control",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Directory holding config.json and logs (default: platform config dir).
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the per-machine agent until Ctrl-C.
    Agent,
    /// Serve one capability on stdin. Started by the agent, not by hand.
    Worker {
        #[arg(long)]
        capability: Uuid,
    },
    /// Interactive controller console.
    Controller {
        /// Address of this machine as the agents see it.
        #[arg(long)]
        own: String,
    },
}

impl Commands {
    /// Log file name for the process role.
    pub fn log_file_name(&self) -> &'static str {
        match self {
            Commands::Agent => "demo-agent.log",
            Commands::Worker { .. } => "demo-worker.log",
            Commands::Controller { .. } => "demo-controller.log",
        }
    }
}
