use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::config::HomeDirUnknown;

/// Failures talking to the host CLI. Its own diagnostics are passed through
/// untouched.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program} {args}` exited with {}: {stderr}", exit_label(.code))]
    Failed {
        program: String,
        args: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(
        "{key} is not set; run `{program} configure set {key} <directory>` to choose a plugin directory"
    )]
    MissingPluginPath { key: String, program: String },

    #[error("plugin artifact {} cannot be resolved: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("plugin directory {} cannot be resolved: {source}", .path.display())]
    PluginDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} already exists", .path.display())]
    LinkExists { path: PathBuf },

    #[error("failed to link {}: {source}", .path.display())]
    Link {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Home(#[from] HomeDirUnknown),

    #[error(transparent)]
    Host(#[from] HostError),
}
