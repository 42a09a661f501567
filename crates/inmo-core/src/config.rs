use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::InmoError;

/// Top-level inmo configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub inmo: InmoConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InmoConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Message sent to senders with no staff account.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for InmoConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            deny_message: default_deny_message(),
        }
    }
}

/// Conversational session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle minutes before a session is reset on access (and swept).
    #[serde(default = "default_idle_timeout_mins")]
    pub idle_timeout_mins: u64,
    /// Seconds between eviction sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_mins: default_idle_timeout_mins(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Bulk-send pacing and ceilings.
///
/// The three caps differ by call path in the original back office; they stay
/// separate knobs rather than one formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_staff_cap")]
    pub staff_cap: usize,
    #[serde(default = "default_filtered_cap")]
    pub filtered_cap: usize,
    #[serde(default = "default_client_cap")]
    pub client_cap: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fixed pause between batches, before jitter.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
    /// Uniform jitter added to the batch pause.
    #[serde(default = "default_batch_jitter_ms")]
    pub batch_jitter_ms: u64,
    /// Uniform jitter added to every inter-send delay.
    #[serde(default = "default_send_jitter_ms")]
    pub send_jitter_ms: u64,
    /// Managerial jobs wait `max(floor, count * per_recipient)` between sends.
    #[serde(default = "default_managerial_floor_ms")]
    pub managerial_floor_ms: u64,
    #[serde(default = "default_managerial_per_recipient_ms")]
    pub managerial_per_recipient_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            staff_cap: default_staff_cap(),
            filtered_cap: default_filtered_cap(),
            client_cap: default_client_cap(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            batch_jitter_ms: default_batch_jitter_ms(),
            send_jitter_ms: default_send_jitter_ms(),
            managerial_floor_ms: default_managerial_floor_ms(),
            managerial_per_recipient_ms: default_managerial_per_recipient_ms(),
        }
    }
}

/// Back-office REST API the resource services talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_services_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout; expiry surfaces as an upstream error.
    #[serde(default = "default_services_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: default_services_url(),
            api_key: String::new(),
            timeout_secs: default_services_timeout_secs(),
        }
    }
}

/// Messaging gateway the transport connector talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_transport_url")]
    pub base_url: String,
    /// Identity the gateway sends as (the office's WhatsApp line).
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_transport_url(),
            sender_id: String::new(),
            api_key: String::new(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

// --- Default value functions ---

fn default_name() -> String {
    "inmo".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_deny_message() -> String {
    "No tienes acceso a este sistema. Contacta al gerente de tu oficina.".to_string()
}
fn default_idle_timeout_mins() -> u64 {
    30
}
fn default_sweep_interval_secs() -> u64 {
    300
}
fn default_staff_cap() -> usize {
    20
}
fn default_filtered_cap() -> usize {
    30
}
fn default_client_cap() -> usize {
    50
}
fn default_batch_size() -> usize {
    5
}
fn default_batch_pause_ms() -> u64 {
    10_000
}
fn default_batch_jitter_ms() -> u64 {
    5_000
}
fn default_send_jitter_ms() -> u64 {
    1_000
}
fn default_managerial_floor_ms() -> u64 {
    5_000
}
fn default_managerial_per_recipient_ms() -> u64 {
    200
}
fn default_services_url() -> String {
    "http://localhost:8080/api".to_string()
}
fn default_services_timeout_secs() -> u64 {
    10
}
fn default_transport_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_poll_interval_secs() -> u64 {
    2
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, InmoError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| InmoError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| InmoError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_defaults() {
        let bc = BroadcastConfig::default();
        assert_eq!(bc.staff_cap, 20);
        assert_eq!(bc.filtered_cap, 30);
        assert_eq!(bc.client_cap, 50);
        assert_eq!(bc.batch_size, 5);
    }

    #[test]
    fn test_session_defaults_from_toml() {
        let toml_str = r#"
            sweep_interval_secs = 60
        "#;
        let sc: SessionConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(sc.idle_timeout_mins, 30);
        assert_eq!(sc.sweep_interval_secs, 60);
    }

    #[test]
    fn test_full_config_parses() {
        let toml_str = r#"
            [inmo]
            name = "oficina-central"

            [broadcast]
            client_cap = 40

            [services]
            base_url = "http://backoffice:9000/api"
            timeout_secs = 8
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.inmo.name, "oficina-central");
        assert_eq!(cfg.broadcast.client_cap, 40);
        assert_eq!(cfg.broadcast.staff_cap, 20);
        assert_eq!(cfg.services.timeout_secs, 8);
        assert_eq!(cfg.session.idle_timeout_mins, 30);
    }
}
