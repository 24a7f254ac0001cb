pub mod error;
pub mod host;
pub mod installer;
pub mod status;

pub use host::AwsCli;
pub use installer::PluginInstaller;
