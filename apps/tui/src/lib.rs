// Shared by the `pitwall` binary and its tests
pub mod backend;
pub mod cli;
pub mod config;
pub mod logger;
pub mod summary;

pub use backend::HttpBackend;
pub use config::DashboardConfig;
