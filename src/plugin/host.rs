use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::plugin::error::HostError;

/// Read/write access to the host tool's persistent configuration.
pub trait HostConfig {
    fn get(&self, key: &str) -> Result<Option<String>, HostError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), HostError>;
}

/// The AWS CLI, driven through `aws configure get|set`.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
}

impl AwsCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn configure(&self, args: &[&str]) -> Result<std::process::Output, HostError> {
        tracing::debug!(program = %self.program.display(), ?args, "invoking host configure");
        Command::new(&self.program)
            .arg("configure")
            .args(args)
            .output()
            .map_err(|source| HostError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }
}

impl HostConfig for AwsCli {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        let output = self.configure(&["get", key])?;
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if value.is_empty() {
            // `configure get` exits 1 with no output when the key is unset.
            return Ok(None);
        }

        if !output.status.success() {
            return Err(HostError::Failed {
                program: self.program.display().to_string(),
                args: format!("configure get {key}"),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), HostError> {
        let output = self.configure(&["set", key, value])?;
        if output.status.success() {
            return Ok(());
        }

        Err(HostError::Failed {
            program: self.program.display().to_string(),
            args: format!("configure set {key} {value}"),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Resolve `name` against `PATH`, skipping any candidate that resolves to
/// `exclude` or to a file inside it when `exclude` is a directory.
///
/// The plugin artifact is commonly installed as `aws` itself, so a plain
/// lookup could find the plugin instead of the real CLI. Names containing a
/// path separator are returned untouched, and so is the bare name when no
/// candidate qualifies.
pub fn locate_program(name: &str, exclude: Option<&Path>) -> PathBuf {
    if Path::new(name).components().count() > 1 {
        return PathBuf::from(name);
    }

    let search = env::var_os("PATH").unwrap_or_default();
    find_in_path(name, &search, exclude).unwrap_or_else(|| PathBuf::from(name))
}

fn find_in_path(name: &str, search: &OsStr, exclude: Option<&Path>) -> Option<PathBuf> {
    let excluded = exclude.and_then(|path| fs::canonicalize(path).ok());

    let mut seen = Vec::new();
    for dir in env::split_paths(search) {
        if seen.contains(&dir) {
            continue;
        }
        seen.push(dir.clone());

        let candidate = dir.join(name);
        if !is_executable(&candidate) {
            continue;
        }

        let same_as_excluded = match (&excluded, fs::canonicalize(&candidate)) {
            (Some(excluded), Ok(resolved)) => resolved.starts_with(excluded),
            _ => false,
        };
        if same_as_excluded {
            tracing::debug!(candidate = %candidate.display(), "skipping plugin artifact on PATH");
            continue;
        }

        return Some(candidate);
    }

    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
