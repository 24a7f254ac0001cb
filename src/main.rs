mod cli;
mod model;
mod plugin;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use model::config::InstallerConfig;
use plugin::host::locate_program;
use plugin::{AwsCli, PluginInstaller};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Keeps the log writer alive until exit.
    let _guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("install-plugin-quick-aws: logging disabled: {err:#}");
            None
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("install-plugin-quick-aws: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = InstallerConfig::load(cli.config.as_deref(), cli.overrides())?;

    let program = locate_program(&config.host.program, Some(&config.plugin.artifact));
    tracing::info!(program = %program.display(), command = ?cli.command(), "quick-aws installer starting");

    let host = AwsCli::new(program);
    let mut installer = PluginInstaller::new(
        host,
        config.host.program.clone(),
        config.host.plugin_path_key.clone(),
        config.plugin.clone(),
    );

    match cli.command() {
        Command::Install => {
            let report = installer.install()?;
            for line in report.lines() {
                println!("{line}");
            }
        }
        Command::Status => {
            let status = installer.status()?;
            for line in status.lines() {
                println!("{line}");
            }
            if !status.is_installed() {
                println!("quick-aws is not installed");
            }
        }
    }

    Ok(())
}

/// Log to a daily file in the data directory, never to stdout.
fn init_logging() -> Result<WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "quick-aws")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "installer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("install_plugin_quick_aws=info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    Ok(guard)
}
