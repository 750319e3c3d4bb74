use serde::{Deserialize, Serialize};
use url::Url;

pub const HOSTS_VAR: &str = "OPENSEARCH_HOSTS";
pub const USERNAME_VAR: &str = "OPENSEARCH_USERNAME";
pub const PASSWORD_VAR: &str = "OPENSEARCH_PASSWORD";
pub const INSECURE_SKIP_VERIFY_VAR: &str = "OPENSEARCH_INSECURE_SKIP_VERIFY";
pub const CA_CERT_VAR: &str = "OPENSEARCH_CA_CERT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("no engine addresses configured")]
    NoAddresses,

    #[error("invalid engine address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Connection settings for the search engine.
///
/// Read-only once built; the client copies what it needs at construction.
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    pub addresses: Vec<String>,
    pub username: String,
    pub password: String,
    /// Disables TLS certificate verification. Off unless explicitly requested.
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Extra PEM root certificate to trust, empty for none
    #[serde(default)]
    pub ca_cert_path: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addresses", &self.addresses)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("ca_cert_path", &self.ca_cert_path)
            .finish()
    }
}

impl Config {
    pub fn new(
        addresses: Vec<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            addresses,
            username: username.into(),
            password: password.into(),
            insecure_skip_verify: false,
            ca_cert_path: String::new(),
        }
    }

    /// Build the config from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// Hosts, username and password are required and must be non-empty.
    /// `OPENSEARCH_HOSTS` may list several comma-separated addresses.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let hosts = required(HOSTS_VAR)?;
        let username = required(USERNAME_VAR)?;
        let password = required(PASSWORD_VAR)?;

        let addresses: Vec<String> = hosts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let insecure_skip_verify = match lookup(INSECURE_SKIP_VERIFY_VAR) {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidVar {
                name: INSECURE_SKIP_VERIFY_VAR,
                value,
            })?,
            None => false,
        };

        let config = Self {
            addresses,
            username,
            password,
            insecure_skip_verify,
            ca_cert_path: lookup(CA_CERT_VAR).unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the config from a JSON file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that there is at least one address and every address is an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addresses.is_empty() {
            return Err(ConfigError::NoAddresses);
        }

        for address in &self.addresses {
            let url = Url::parse(address).map_err(|e| ConfigError::InvalidAddress {
                address: address.clone(),
                reason: e.to_string(),
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidAddress {
                    address: address.clone(),
                    reason: format!("unsupported scheme {:?}", url.scheme()),
                });
            }
            if url.cannot_be_a_base() || url.host().is_none() {
                return Err(ConfigError::InvalidAddress {
                    address: address.clone(),
                    reason: "missing host".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
