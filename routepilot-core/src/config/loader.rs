//! Configuration file loading and merging

use super::schema::Config;
use crate::error::{Result, RoutepilotError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        // Priority order:
        // 1. $ROUTEPILOT_CONFIG
        // 2. $XDG_CONFIG_HOME/routepilot/config.toml
        // 3. ~/.config/routepilot/config.toml

        if let Ok(path) = env::var("ROUTEPILOT_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("routepilot/config.toml");
        }

        if let Ok(home) = env::var("HOME") {
            return PathBuf::from(home).join(".config/routepilot/config.toml");
        }

        PathBuf::from("config.toml")
    }

    /// Load config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| RoutepilotError::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load built-in configuration embedded in the binary
    pub fn load_builtin() -> Result<Config> {
        const BUILTIN_TOML: &str = include_str!("../builtin-config.toml");
        let config: Config = toml::from_str(BUILTIN_TOML)?;
        Ok(config)
    }

    /// Merge user config on top of built-in config
    /// Host and schedule sections are taken wholesale from the user config;
    /// diagnostics provider slots override individually and routes extend.
    pub fn merge_configs(builtin: Config, user: Config) -> Config {
        let mut merged = builtin;

        merged.host = user.host;
        merged.schedule = user.schedule;

        if user.diagnostics.timeout_secs.is_some() {
            merged.diagnostics.timeout_secs = user.diagnostics.timeout_secs;
        }
        if user.diagnostics.routing_policy.is_some() {
            merged.diagnostics.routing_policy = user.diagnostics.routing_policy;
        }
        if user.diagnostics.egress.is_some() {
            merged.diagnostics.egress = user.diagnostics.egress;
        }
        if user.diagnostics.ingress.is_some() {
            merged.diagnostics.ingress = user.diagnostics.ingress;
        }
        if user.diagnostics.risk.is_some() {
            merged.diagnostics.risk = user.diagnostics.risk;
        }
        for (name, route) in user.diagnostics.routes {
            merged.diagnostics.routes.insert(name, route);
        }

        merged
    }

    /// Load config with built-in as lowest-priority fallback
    /// Priority: User config > Built-in config
    pub fn load_with_builtins() -> Result<Config> {
        let builtin = Self::load_builtin()?;
        let path = Self::default_config_path();

        let config = if path.exists() {
            let user = Self::load_from_file(&path)?;
            Self::merge_configs(builtin, user)
        } else {
            tracing::debug!("User config not found at {:?}, using built-in defaults", path);
            builtin
        };
        config.validate()?;
        Ok(config)
    }

    /// Load config from optional path or default with built-in merge
    /// Priority: Explicit path > User config > Built-in config
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Config> {
        if let Some(p) = path {
            let user = Self::load_from_file(&p)?;
            let builtin = Self::load_builtin()?;
            let config = Self::merge_configs(builtin, user);
            config.validate()?;
            Ok(config)
        } else {
            Self::load_with_builtins()
        }
    }
}
