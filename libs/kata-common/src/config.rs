// Application configuration, read from the environment

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: String,
    pub redis_url: String,
    pub judge0_url: String,
    pub judge0_api_key: Option<String>,
    pub judge0_api_host: Option<String>,
    pub judge0_base64: bool,
    pub catalog_url: String,
    pub poll: PollPolicy,
}

/// Client-driven polling: fixed delay before each status request, bounded attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let judge0_base64 = match lookup("JUDGE0_BASE64") {
            None => false,
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "JUDGE0_BASE64",
                        value,
                        expected: "a boolean",
                    })
                }
            },
        };

        let interval_ms = match lookup("POLL_INTERVAL_MS") {
            None => DEFAULT_POLL_INTERVAL_MS,
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: "POLL_INTERVAL_MS",
                value,
                expected: "milliseconds",
            })?,
        };

        let max_attempts = match lookup("POLL_MAX_ATTEMPTS") {
            None => DEFAULT_POLL_MAX_ATTEMPTS,
            Some(value) => value.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                var: "POLL_MAX_ATTEMPTS",
                value,
                expected: "a positive integer",
            })?,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000"),
            redis_url: var("REDIS_URL", "redis://127.0.0.1:6379"),
            judge0_url: var("JUDGE0_URL", "https://judge0-ce.p.rapidapi.com")
                .trim_end_matches('/')
                .to_string(),
            judge0_api_key: optional("JUDGE0_API_KEY"),
            judge0_api_host: optional("JUDGE0_API_HOST"),
            judge0_base64,
            catalog_url: var("CATALOG_URL", "https://leetcode.com/graphql"),
            poll: PollPolicy {
                interval: Duration::from_millis(interval_ms),
                max_attempts: max_attempts.max(1),
            },
        })
    }
}
