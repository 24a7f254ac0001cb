use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::{PluginSettings, expand_tilde};
use crate::plugin::error::InstallError;
use crate::plugin::host::HostConfig;
use crate::plugin::status::{InstallStatus, LinkState};

/// Outcome of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub link: PathBuf,
    pub target: PathBuf,
    pub key: String,
    pub value: String,
}

impl InstallReport {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("linked {} -> {}", self.link.display(), self.target.display()),
            format!("registered {} = {}", self.key, self.value),
        ]
    }
}

/// Installs one plugin into the host tool's legacy plugin directory.
pub struct PluginInstaller<H> {
    host: H,
    program: String,
    plugin_path_key: String,
    plugin: PluginSettings,
}

impl<H: HostConfig> PluginInstaller<H> {
    /// `program` is only used to phrase remediation hints.
    pub fn new(
        host: H,
        program: impl Into<String>,
        plugin_path_key: impl Into<String>,
        plugin: PluginSettings,
    ) -> Self {
        Self {
            host,
            program: program.into(),
            plugin_path_key: plugin_path_key.into(),
            plugin,
        }
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Resolve, check, link, register. Nothing is touched unless the plugin
    /// directory is configured.
    pub fn install(&mut self) -> Result<InstallReport, InstallError> {
        let plugin_dir = self.resolve_plugin_dir()?.ok_or_else(|| {
            tracing::warn!(key = %self.plugin_path_key, "plugin directory is not configured");
            InstallError::MissingPluginPath {
                key: self.plugin_path_key.clone(),
                program: self.program.clone(),
            }
        })?;

        let (link, target) = self.link(&plugin_dir)?;
        let (key, value) = self.register()?;

        Ok(InstallReport {
            link,
            target,
            key,
            value,
        })
    }

    /// Read-only view of what an install would touch.
    pub fn status(&self) -> Result<InstallStatus, InstallError> {
        let plugin_dir = self.resolve_plugin_dir()?;
        let link = plugin_dir.as_ref().map(|dir| {
            let path = dir.join(&self.plugin.name);
            let state = LinkState::inspect(&path);
            (path, state)
        });
        let registered = self.host.get(&self.plugin.register_key)?;

        Ok(InstallStatus {
            plugin_path_key: self.plugin_path_key.clone(),
            plugin_dir,
            link,
            register_key: self.plugin.register_key.clone(),
            registered,
        })
    }

    /// The configured plugin directory with `~` expanded; `None` when unset
    /// or blank.
    fn resolve_plugin_dir(&self) -> Result<Option<PathBuf>, InstallError> {
        let Some(raw) = self.host.get(&self.plugin_path_key)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let dir = expand_tilde(Path::new(raw))?;
        tracing::info!(key = %self.plugin_path_key, dir = %dir.display(), "resolved plugin directory");
        Ok(Some(dir))
    }

    fn link(&self, plugin_dir: &Path) -> Result<(PathBuf, PathBuf), InstallError> {
        let target =
            fs::canonicalize(&self.plugin.artifact).map_err(|source| InstallError::Artifact {
                path: self.plugin.artifact.clone(),
                source,
            })?;
        let dir = fs::canonicalize(plugin_dir).map_err(|source| InstallError::PluginDir {
            path: plugin_dir.to_path_buf(),
            source,
        })?;

        let link = dir.join(&self.plugin.name);
        match symlink(&target, &link) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(InstallError::LinkExists { path: link });
            }
            Err(source) => return Err(InstallError::Link { path: link, source }),
        }

        tracing::info!(link = %link.display(), target = %target.display(), "created plugin link");
        Ok((link, target))
    }

    fn register(&mut self) -> Result<(String, String), InstallError> {
        let key = self.plugin.register_key.clone();
        let value = self.plugin.entry_point.to_string();
        self.host.set(&key, &value)?;

        tracing::info!(%key, %value, "registered plugin entry point");
        Ok((key, value))
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::model::config::HomeDirUnknown;
    use crate::plugin::error::HostError;
    use std::collections::HashMap;

    /// In-memory host configuration that records every write.
    #[derive(Debug, Default)]
    struct FakeHost {
        values: HashMap<String, String>,
        writes: Vec<(String, String)>,
        fail_writes: bool,
    }

    impl FakeHost {
        fn with(key: &str, value: &str) -> Self {
            let mut host = Self::default();
            host.values.insert(key.to_string(), value.to_string());
            host
        }
    }

    impl HostConfig for FakeHost {
        fn get(&self, key: &str) -> Result<Option<String>, HostError> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), HostError> {
            if self.fail_writes {
                return Err(HostError::Failed {
                    program: "aws".into(),
                    args: format!("configure set {key} {value}"),
                    code: Some(255),
                    stderr: "permission denied".into(),
                });
            }
            self.writes.push((key.to_string(), value.to_string()));
            self.values.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    const PATH_KEY: &str = "plugins.cli_legacy_plugin_path";
    const REGISTER_KEY: &str = "plugins.quick_aws_command_server";

    struct Workspace {
        _root: tempfile::TempDir,
        artifact: PathBuf,
        plugin_dir: PathBuf,
    }

    fn workspace() -> Workspace {
        let root = tempfile::tempdir().unwrap();
        let artifact = root.path().join("quick-aws");
        fs::create_dir(&artifact).unwrap();
        fs::write(artifact.join("plugin.py"), "").unwrap();
        let plugin_dir = root.path().join("plugins");
        fs::create_dir(&plugin_dir).unwrap();
        Workspace {
            _root: root,
            artifact,
            plugin_dir,
        }
    }

    fn settings(artifact: &Path) -> PluginSettings {
        PluginSettings {
            name: "quick-aws".into(),
            artifact: artifact.to_path_buf(),
            register_key: REGISTER_KEY.into(),
            entry_point: "quick-aws.plugin".parse().unwrap(),
        }
    }

    fn installer(host: FakeHost, artifact: &Path) -> PluginInstaller<FakeHost> {
        PluginInstaller::new(host, "aws", PATH_KEY, settings(artifact))
    }

    #[test]
    fn unset_plugin_path_aborts_without_mutation() {
        let ws = workspace();
        let mut installer = installer(FakeHost::default(), &ws.artifact);

        let err = installer.install().unwrap_err();

        assert!(matches!(err, InstallError::MissingPluginPath { .. }));
        let message = err.to_string();
        assert!(message.contains(PATH_KEY));
        assert!(message.contains("aws configure set plugins.cli_legacy_plugin_path"));
        assert!(installer.host().writes.is_empty());
        assert_eq!(fs::read_dir(&ws.plugin_dir).unwrap().count(), 0);
    }

    #[test]
    fn blank_plugin_path_counts_as_unset() {
        let ws = workspace();
        let mut installer = installer(FakeHost::with(PATH_KEY, "   "), &ws.artifact);

        assert!(matches!(
            installer.install(),
            Err(InstallError::MissingPluginPath { .. })
        ));
        assert!(installer.host().writes.is_empty());
    }

    #[test]
    fn install_links_canonical_artifact_and_registers_once() {
        let ws = workspace();
        let host = FakeHost::with(PATH_KEY, &ws.plugin_dir.to_string_lossy());
        let mut installer = installer(host, &ws.artifact);

        let report = installer.install().unwrap();

        let canonical_dir = fs::canonicalize(&ws.plugin_dir).unwrap();
        let canonical_artifact = fs::canonicalize(&ws.artifact).unwrap();
        assert_eq!(report.link, canonical_dir.join("quick-aws"));
        assert_eq!(report.target, canonical_artifact);
        assert_eq!(fs::read_link(&report.link).unwrap(), canonical_artifact);
        assert_eq!(fs::read_dir(&ws.plugin_dir).unwrap().count(), 1);
        assert_eq!(
            installer.host().writes,
            vec![(REGISTER_KEY.to_string(), "quick-aws.plugin".to_string())]
        );
        assert_eq!(
            report.lines()[1],
            "registered plugins.quick_aws_command_server = quick-aws.plugin"
        );
    }

    #[test]
    fn reinstall_fails_because_link_exists() {
        let ws = workspace();
        let host = FakeHost::with(PATH_KEY, &ws.plugin_dir.to_string_lossy());
        let mut installer = installer(host, &ws.artifact);

        installer.install().unwrap();
        let err = installer.install().unwrap_err();

        assert!(matches!(err, InstallError::LinkExists { .. }));
        assert_eq!(installer.host().writes.len(), 1);
    }

    #[test]
    fn missing_artifact_is_reported_before_linking() {
        let ws = workspace();
        let host = FakeHost::with(PATH_KEY, &ws.plugin_dir.to_string_lossy());
        let mut installer = installer(host, &ws.plugin_dir.join("no-such-artifact"));

        assert!(matches!(
            installer.install(),
            Err(InstallError::Artifact { .. })
        ));
        assert!(installer.host().writes.is_empty());
    }

    #[test]
    fn home_lookup_failure_keeps_its_own_error() {
        let err: InstallError = HomeDirUnknown(PathBuf::from("~/plugins")).into();

        assert!(matches!(err, InstallError::Home(_)));
        assert_eq!(
            err.to_string(),
            "cannot expand ~/plugins: home directory is unknown"
        );
    }

    #[test]
    fn tilde_plugin_path_resolves_under_home() {
        let ws = workspace();
        let installer = installer(FakeHost::with(PATH_KEY, "~/.aws/plugins"), &ws.artifact);
        let home = directories::BaseDirs::new().unwrap().home_dir().to_path_buf();

        let status = installer.status().unwrap();
        assert_eq!(status.plugin_dir, Some(home.join(".aws/plugins")));
    }

    #[test]
    fn missing_plugin_dir_is_reported() {
        let ws = workspace();
        let host = FakeHost::with(PATH_KEY, &ws.plugin_dir.join("absent").to_string_lossy());
        let mut installer = installer(host, &ws.artifact);

        assert!(matches!(
            installer.install(),
            Err(InstallError::PluginDir { .. })
        ));
    }

    #[test]
    fn registration_failure_surfaces_host_error() {
        let ws = workspace();
        let mut host = FakeHost::with(PATH_KEY, &ws.plugin_dir.to_string_lossy());
        host.fail_writes = true;
        let mut installer = installer(host, &ws.artifact);

        let err = installer.install().unwrap_err();

        assert!(matches!(err, InstallError::Host(HostError::Failed { .. })));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn status_reflects_install_without_mutating() {
        let ws = workspace();
        let host = FakeHost::with(PATH_KEY, &ws.plugin_dir.to_string_lossy());
        let mut installer = installer(host, &ws.artifact);

        let before = installer.status().unwrap();
        assert!(matches!(before.link, Some((_, LinkState::Missing))));
        assert_eq!(before.registered, None);

        installer.install().unwrap();
        let after = installer.status().unwrap();

        let canonical_artifact = fs::canonicalize(&ws.artifact).unwrap();
        assert!(matches!(
            after.link,
            Some((_, LinkState::Linked(ref target))) if *target == canonical_artifact
        ));
        assert_eq!(after.registered.as_deref(), Some("quick-aws.plugin"));
        assert_eq!(installer.host().writes.len(), 1);
    }

    #[test]
    fn status_without_plugin_path_has_no_link() {
        let ws = workspace();
        let installer = installer(FakeHost::default(), &ws.artifact);

        let status = installer.status().unwrap();
        assert_eq!(status.plugin_dir, None);
        assert!(status.link.is_none());
    }
}
