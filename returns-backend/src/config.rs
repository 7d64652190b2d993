use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::auth::gate::GateMode;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "RETURNS_CONFIG";
const API_KEY_ENV: &str = "SHIPDELIGHT_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// Root of the carrier API, without trailing slash
    #[serde(default = "default_carrier_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Applied to every outbound carrier request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Web API key of the identity project
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,

    #[serde(default = "default_token_base_url")]
    pub token_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub gate_mode: GateMode,

    /// Seed for the session signing key
    #[serde(default)]
    pub session_secret: String,

    /// Adds `Secure` to every auth cookie; turn on in production
    #[serde(default)]
    pub secure_cookies: bool,

    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Mounts the test-token and debug-tracking routes
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_carrier_base_url() -> String {
    "https://appapi.shipdelight.com".to_string()
}

fn default_auth_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_base_url() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_session_ttl_days() -> i64 {
    7
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            base_url: default_carrier_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_base_url: default_auth_base_url(),
            token_base_url: default_token_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            gate_mode: GateMode::default(),
            session_secret: String::new(),
            secure_cookies: false,
            session_ttl_days: default_session_ttl_days(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Environment overrides applied after the file is parsed.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.carrier.api_key = key;
            }
        }
    }

    /// Rejects settings the service cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.carrier.api_key.trim().is_empty() {
            anyhow::bail!("carrier.api_key is not set (config file or {})", API_KEY_ENV);
        }
        if self.identity.api_key.trim().is_empty() {
            anyhow::bail!("identity.api_key is not set");
        }
        if self.auth.gate_mode == GateMode::Verified && self.auth.session_secret.len() < 16 {
            anyhow::bail!("auth.session_secret must be at least 16 characters in verified mode");
        }
        if self.auth.session_ttl_days <= 0 {
            anyhow::bail!("auth.session_ttl_days must be positive");
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Load the config file (or `$RETURNS_CONFIG`) into [`CONFIG`].
pub fn read_config() -> anyhow::Result<&'static AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = AppConfig::from_file(&path)?;
    config.apply_env();
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration already loaded"))?;
    CONFIG
        .get()
        .ok_or_else(|| anyhow::anyhow!("Configuration not initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.carrier.base_url, "https://appapi.shipdelight.com");
        assert_eq!(config.auth.gate_mode, GateMode::Verified);
        assert_eq!(config.auth.session_ttl_days, 7);
        assert!(!config.diagnostics.enabled);
        assert_eq!(config.server_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080
log_level = "debug"

[carrier]
api_key = "abc123"
timeout_secs = 5

[identity]
api_key = "web-key"

[auth]
gate_mode = "presence"
secure_cookies = true

[diagnostics]
enabled = true
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.carrier.api_key, "abc123");
        assert_eq!(config.carrier.timeout_secs, 5);
        assert_eq!(config.auth.gate_mode, GateMode::Presence);
        assert!(config.auth.secure_cookies);
        assert!(config.diagnostics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_key_and_short_secret() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.carrier.api_key = "key".into();
        config.identity.api_key = "web-key".into();
        config.auth.session_secret = "short".into();
        assert!(config.validate().is_err());

        config.auth.session_secret = "a-long-enough-session-secret".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_identity_key() {
        let mut config = AppConfig::default();
        config.carrier.api_key = "key".into();
        config.auth.session_secret = "a-long-enough-session-secret".into();
        config.identity.api_key = "   ".into();

        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "identity.api_key is not set");

        config.identity.api_key = "web-key".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::from_file("/definitely/not/here.toml").is_err());
    }
}
