// Copyright (c) 2026 NeuroSwarm Contributors
// SPDX-License-Identifier: AGPL-3.0

// Registry Configuration Types
//
// Defines the configuration schema for a NeuroSwarm registry node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Protocol timing (heartbeat, registration window, discovery cache TTL)
// - Swarm limits and reputation floor
// - Discovery query budget and event bus sizing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::protocol::{
    ProtocolSettings, DISCOVERY_CACHE_TTL_MS, HEARTBEAT_INTERVAL_MS, MAX_AGENTS_PER_SWARM,
    MIN_AGENT_REPUTATION, REGISTRATION_TIMEOUT_MS,
};

pub const CONFIG_API_VERSION: &str = "neuroswarm.ai/v1";
pub const CONFIG_KIND: &str = "RegistryConfig";
pub const CONFIG_PATH_ENV: &str = "NEUROSWARM_CONFIG_PATH";

/// Top-level Kubernetes-style registry configuration manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// API version (must be "neuroswarm.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "RegistryConfig")
    pub kind: String,

    pub metadata: ConfigMetadata,

    #[serde(default)]
    pub spec: RegistrySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Human-readable registry name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistrySpec {
    #[serde(default)]
    pub protocol: ProtocolConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_heartbeat_interval", with = "humantime_serde")]
    pub heartbeat_interval: Duration,

    #[serde(default = "default_registration_timeout", with = "humantime_serde")]
    pub registration_timeout: Duration,

    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub discovery_cache_ttl: Duration,

    #[serde(default = "default_max_agents")]
    pub max_agents_per_swarm: usize,

    #[serde(default = "default_min_reputation")]
    pub min_reputation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Budget for a single discovery query when the caller gives none
    #[serde(default = "default_query_timeout", with = "humantime_serde")]
    pub query_timeout: Duration,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Events buffered per subscriber before the oldest are dropped
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

// Defaults
fn default_heartbeat_interval() -> Duration {
    Duration::from_millis(HEARTBEAT_INTERVAL_MS)
}

fn default_registration_timeout() -> Duration {
    Duration::from_millis(REGISTRATION_TIMEOUT_MS)
}

fn default_cache_ttl() -> Duration {
    Duration::from_millis(DISCOVERY_CACHE_TTL_MS)
}

fn default_max_agents() -> usize {
    MAX_AGENTS_PER_SWARM
}

fn default_min_reputation() -> f64 {
    MIN_AGENT_REPUTATION
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_true() -> bool {
    true
}

fn default_event_capacity() -> usize {
    1000
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: default_heartbeat_interval(),
            registration_timeout: default_registration_timeout(),
            discovery_cache_ttl: default_cache_ttl(),
            max_agents_per_swarm: default_max_agents(),
            min_reputation: default_min_reputation(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            query_timeout: default_query_timeout(),
            cache_enabled: true,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: default_event_capacity() }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_version: CONFIG_API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ConfigMetadata {
                name: "local-registry".to_string(),
                version: None,
            },
            spec: RegistrySpec::default(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. NEUROSWARM_CONFIG_PATH environment variable
    /// 2. ./neuroswarm-config.yaml (working directory)
    /// 3. ~/.neuroswarm/config.yaml (user home)
    /// 4. /etc/neuroswarm/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./neuroswarm-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".neuroswarm").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/neuroswarm/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load from an explicit path (fail if missing/invalid), else discover,
    /// else fall back to protocol defaults.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using protocol defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NEUROSWARM_QUERY_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) => self.spec.discovery.query_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!("Ignoring invalid NEUROSWARM_QUERY_TIMEOUT_MS value: {}", val),
            }
        }

        if let Ok(val) = std::env::var("NEUROSWARM_CACHE_ENABLED") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.spec.discovery.cache_enabled = true,
                "false" | "0" | "no" => self.spec.discovery.cache_enabled = false,
                _ => tracing::warn!("Ignoring invalid NEUROSWARM_CACHE_ENABLED value: {}", val),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != CONFIG_API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                CONFIG_API_VERSION
            );
        }

        if self.kind != CONFIG_KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, CONFIG_KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let protocol = &self.spec.protocol;
        let durations = [
            ("spec.protocol.heartbeat_interval", protocol.heartbeat_interval),
            ("spec.protocol.registration_timeout", protocol.registration_timeout),
            ("spec.protocol.discovery_cache_ttl", protocol.discovery_cache_ttl),
            ("spec.discovery.query_timeout", self.spec.discovery.query_timeout),
        ];
        for (field, value) in durations {
            if value.is_zero() {
                anyhow::bail!("{} must be greater than zero", field);
            }
        }

        if protocol.max_agents_per_swarm == 0 || protocol.max_agents_per_swarm > MAX_AGENTS_PER_SWARM {
            anyhow::bail!(
                "spec.protocol.max_agents_per_swarm must be between 1 and {}, got {}",
                MAX_AGENTS_PER_SWARM,
                protocol.max_agents_per_swarm
            );
        }

        if !(0.0..=1.0).contains(&protocol.min_reputation) {
            anyhow::bail!(
                "spec.protocol.min_reputation must be between 0.0 and 1.0, got {}",
                protocol.min_reputation
            );
        }

        if self.spec.events.capacity == 0 {
            anyhow::bail!("spec.events.capacity must be greater than zero");
        }

        Ok(())
    }

    /// Runtime protocol parameters derived from this configuration.
    pub fn settings(&self) -> ProtocolSettings {
        let protocol = &self.spec.protocol;
        ProtocolSettings {
            heartbeat_interval: protocol.heartbeat_interval,
            registration_timeout: protocol.registration_timeout,
            discovery_cache_ttl: protocol.discovery_cache_ttl,
            max_agents_per_swarm: protocol.max_agents_per_swarm,
            min_reputation: protocol.min_reputation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_manifest_uses_protocol_defaults() {
        let yaml = r#"
apiVersion: neuroswarm.ai/v1
kind: RegistryConfig
metadata:
  name: test-registry
"#;
        let config = RegistryConfig::from_yaml_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings(), ProtocolSettings::default());
        assert_eq!(config.spec.discovery.query_timeout, Duration::from_secs(2));
        assert!(config.spec.discovery.cache_enabled);
        assert_eq!(config.spec.events.capacity, 1000);
    }

    #[test]
    fn test_humantime_durations() {
        let yaml = r#"
apiVersion: neuroswarm.ai/v1
kind: RegistryConfig
metadata:
  name: fast
spec:
  protocol:
    heartbeat_interval: 5s
    registration_timeout: 1m
    discovery_cache_ttl: 500ms
    max_agents_per_swarm: 8
  discovery:
    query_timeout: 250ms
"#;
        let config = RegistryConfig::from_yaml_str(yaml).unwrap();
        let settings = config.settings();
        assert_eq!(settings.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(settings.registration_timeout, Duration::from_secs(60));
        assert_eq!(settings.discovery_cache_ttl, Duration::from_millis(500));
        assert_eq!(settings.max_agents_per_swarm, 8);
        assert_eq!(config.spec.discovery.query_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RegistryConfig::default();
        config.kind = "NodeConfig".to_string();
        assert!(config.validate().is_err());

        let mut config = RegistryConfig::default();
        config.spec.protocol.max_agents_per_swarm = 51;
        assert!(config.validate().is_err());

        let mut config = RegistryConfig::default();
        config.spec.protocol.min_reputation = 1.5;
        assert!(config.validate().is_err());

        let mut config = RegistryConfig::default();
        config.spec.protocol.heartbeat_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = RegistryConfig::default();
        std::fs::write(&path, config.to_yaml_string().unwrap()).unwrap();

        let loaded = RegistryConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.metadata.name, "local-registry");
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let result = RegistryConfig::load_or_default(Some(PathBuf::from("/nonexistent/neuroswarm.yaml")));
        assert!(result.is_err());
    }
}
