//! Automation toolkit for proxy clients: peak-window policy scheduling and
//! network identity diagnostics

pub mod config;
pub mod diag;
pub mod error;
pub mod fetch;
pub mod host;
pub mod schedule;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, DiagnosticsConfig, HostConfig, ScheduleConfig};
pub use diag::{collect_identity, run_diagnostics, NetworkIdentityReport};
pub use error::{ErrorKind, FetchError, Result, RoutepilotError};
pub use fetch::{FetchOptions, HttpFetch, ReqwestFetch};
pub use host::{ApiHost, HostRuntime, PanelResult};
pub use schedule::{decide, run_schedule, PolicyDecision, Reason, TimeWindowRule};
