use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Missing,
    Linked(PathBuf),
    NotALink,
}

impl LinkState {
    pub fn inspect(path: &Path) -> Self {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => fs::read_link(path)
                .map(LinkState::Linked)
                .unwrap_or(LinkState::NotALink),
            Ok(_) => LinkState::NotALink,
            Err(_) => LinkState::Missing,
        }
    }
}

/// Snapshot of the host configuration and plugin directory.
#[derive(Debug, Clone)]
pub struct InstallStatus {
    pub plugin_path_key: String,
    pub plugin_dir: Option<PathBuf>,
    pub link: Option<(PathBuf, LinkState)>,
    pub register_key: String,
    pub registered: Option<String>,
}

impl InstallStatus {
    pub fn is_installed(&self) -> bool {
        matches!(self.link, Some((_, LinkState::Linked(_)))) && self.registered.is_some()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut rows = Vec::with_capacity(3);

        rows.push(match &self.plugin_dir {
            Some(dir) => format!("{}: {}", self.plugin_path_key, dir.display()),
            None => format!("{}: not set", self.plugin_path_key),
        });

        if let Some((path, state)) = &self.link {
            let state = match state {
                LinkState::Missing => "missing".to_string(),
                LinkState::Linked(target) => format!("-> {}", target.display()),
                LinkState::NotALink => "exists, not a link".to_string(),
            };
            rows.push(format!("link {} [{state}]", path.display()));
        }

        rows.push(match &self.registered {
            Some(value) => format!("{} = {value}", self.register_key),
            None => format!("{}: not registered", self.register_key),
        });

        rows
    }
}
