use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::config::Overrides;
use crate::model::entry_point::EntryPoint;

/// Install the quick-aws command server into the AWS CLI plugin directory.
#[derive(Debug, Parser)]
#[command(name = "install-plugin-quick-aws", version, about)]
pub struct Cli {
    /// Configuration file to use instead of the per-user one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host CLI executable; bare names are looked up on PATH
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub host_program: Option<String>,

    /// Local build artifact to link into the plugin directory
    #[arg(long, global = true, value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Entry point to register, as `module` or `module:symbol`
    #[arg(long, global = true, value_name = "ENTRY")]
    pub entry_point: Option<EntryPoint>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Link the plugin and register its entry point (default)
    Install,
    /// Show the plugin directory, link and registration without changing them
    Status,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Install)
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            host_program: self.host_program.clone(),
            artifact: self.artifact.clone(),
            entry_point: self.entry_point.clone(),
        }
    }
}
