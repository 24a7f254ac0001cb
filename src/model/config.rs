use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::entry_point::EntryPoint;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct InstallerConfig {
    pub host: HostSettings,
    pub plugin: PluginSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostSettings {
    pub program: String,
    pub plugin_path_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginSettings {
    pub name: String,
    pub artifact: PathBuf,
    pub register_key: String,
    pub entry_point: EntryPoint,
}

/// Values given on the command line. They win over every file layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host_program: Option<String>,
    pub artifact: Option<PathBuf>,
    pub entry_point: Option<EntryPoint>,
}

impl InstallerConfig {
    /// Load configuration with layering: defaults → user config → overrides.
    ///
    /// `explicit` replaces the per-user config file lookup. Unlike the user
    /// file, it must exist.
    pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let user_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.exists()),
        };

        let user = match user_path {
            Some(path) => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
            ),
            None => None,
        };

        let mut config = Self::from_layers(user.as_deref())?;
        config.apply(overrides);
        config.expand_home()?;
        Ok(config)
    }

    fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(DEFAULTS)?;
        if let Some(user) = user {
            let user_table: toml::Table = toml::from_str(user).context("parsing user config")?;
            merge(&mut table, user_table);
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(program) = overrides.host_program {
            self.host.program = program;
        }
        if let Some(artifact) = overrides.artifact {
            self.plugin.artifact = artifact;
        }
        if let Some(entry_point) = overrides.entry_point {
            self.plugin.entry_point = entry_point;
        }
    }

    fn expand_home(&mut self) -> Result<()> {
        self.plugin.artifact = expand_tilde(&self.plugin.artifact)?;
        if self.host.program.starts_with('~') {
            self.host.program = expand_tilde(Path::new(&self.host.program))?
                .to_string_lossy()
                .into_owned();
        }
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "quick-aws")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Deep-merge `overlay` into `base`. Tables merge key by key, anything else
/// is replaced.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cannot expand {}: home directory is unknown", .0.display())]
pub struct HomeDirUnknown(pub PathBuf);

/// Expand a leading `~` component to the current user's home directory.
///
/// `~user` forms are left as they are.
pub fn expand_tilde(path: &Path) -> Result<PathBuf, HomeDirUnknown> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = dirs_home().ok_or_else(|| HomeDirUnknown(path.to_path_buf()))?;
    if rest.as_os_str().is_empty() {
        return Ok(home);
    }
    Ok(home.join(rest))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
