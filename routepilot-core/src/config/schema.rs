//! Configuration schema types

use crate::error::{Result, RoutepilotError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Complete routepilot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Reject malformed settings before any component runs with them
    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()
    }
}

/// Local management API of the proxy client that owns the policy groups
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer secret for the management API, if it requires one
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_api_url() -> String {
    "http://127.0.0.1:9090".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            secret: None,
        }
    }
}

/// Peak-window scheduling settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Policy group whose selection is switched
    #[serde(default = "default_group")]
    pub group: String,
    /// Node selected during the peak window
    #[serde(default = "default_peak_node")]
    pub peak_node: String,
    /// Node selected outside the peak window
    #[serde(default = "default_normal_node")]
    pub normal_node: String,
    /// First hour (inclusive) of the peak window
    #[serde(default = "default_peak_start_hour")]
    pub peak_start_hour: u32,
    /// First hour past the peak window (exclusive); may wrap past midnight
    #[serde(default = "default_peak_end_hour")]
    pub peak_end_hour: u32,
}

fn default_group() -> String {
    "PikPak".to_string()
}

fn default_peak_node() -> String {
    "Proxy".to_string()
}

fn default_normal_node() -> String {
    "LowCost".to_string()
}

fn default_peak_start_hour() -> u32 {
    18
}

fn default_peak_end_hour() -> u32 {
    2
}

impl ScheduleConfig {
    /// Window bounds must be hours of the day; anything else would make the
    /// peak test silently unsatisfiable
    pub fn validate(&self) -> Result<()> {
        for (name, hour) in [
            ("peak_start_hour", self.peak_start_hour),
            ("peak_end_hour", self.peak_end_hour),
        ] {
            if hour > 23 {
                return Err(RoutepilotError::ConfigError(format!(
                    "{name} out of range: {hour} (expected 0-23)"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            group: default_group(),
            peak_node: default_peak_node(),
            normal_node: default_normal_node(),
            peak_start_hour: default_peak_start_hour(),
            peak_end_hour: default_peak_end_hour(),
        }
    }
}

/// Identity provider settings for the diagnostics aggregator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagnosticsConfig {
    /// Per-provider deadline in seconds; unset means the built-in default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Pin provider queries through this named policy instead of the
    /// default route
    #[serde(default)]
    pub routing_policy: Option<String>,
    #[serde(default)]
    pub egress: Option<ProviderConfig>,
    #[serde(default)]
    pub ingress: Option<ProviderConfig>,
    /// Dedicated risk-scoring provider; when absent, risk falls back to the
    /// ingress provider's security block (nested format only)
    #[serde(default)]
    pub risk: Option<ProviderConfig>,
    /// Policy name -> proxy URL, used to pin routed measurements
    #[serde(default)]
    pub routes: HashMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    5
}

impl DiagnosticsConfig {
    /// Effective per-provider deadline
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or_else(default_timeout_secs))
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            routing_policy: None,
            egress: None,
            ingress: None,
            risk: None,
            routes: HashMap::new(),
        }
    }
}

/// One third-party identity provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub url: String,
    /// API token or key; sent as a query parameter when `token_param` is
    /// set, as a bearer header otherwise
    #[serde(default)]
    pub token: Option<String>,
    /// Query parameter name carrying the token (e.g. "token", "key")
    #[serde(default)]
    pub token_param: Option<String>,
    #[serde(default)]
    pub format: PayloadFormat,
}

/// Shape of a provider's JSON payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// Lightweight top-level `{ ip, country, region, city, org, asn, isp }`
    #[default]
    Flat,
    /// ipregistry-style `{ location, connection, security }` nesting
    Nested,
}
