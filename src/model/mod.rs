pub mod config;
pub mod entry_point;
