//! Configuration loading and schema

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    Config, DiagnosticsConfig, HostConfig, PayloadFormat, ProviderConfig, ScheduleConfig,
};
