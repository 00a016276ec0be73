//! Configuration loading and resolution.
//!
//! Each setting resolves as: explicit value (CLI flag) > environment variable > default.

use std::time::Duration;

use mcp_framing::DEFAULT_MAX_CONTENT_LENGTH;

pub const READ_TIMEOUT_ENV: &str = "ECHO_MCP_READ_TIMEOUT_MS";
pub const MAX_CONTENT_LENGTH_ENV: &str = "ECHO_MCP_MAX_CONTENT_LENGTH";

/// Settings for one serving loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deadline for receiving each complete frame. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Largest `Content-Length` accepted from the peer.
    pub max_content_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Resolve against the process environment.
    pub fn resolve(read_timeout_ms: Option<u64>, max_content_length: Option<usize>) -> Self {
        Self::resolve_with(read_timeout_ms, max_content_length, |key| {
            std::env::var(key).ok()
        })
    }

    /// Resolve with a custom environment lookup.
    pub fn resolve_with<F>(
        read_timeout_ms: Option<u64>,
        max_content_length: Option<usize>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let read_timeout_ms =
            read_timeout_ms.or_else(|| env_number::<u64, _>(&env, READ_TIMEOUT_ENV));
        let max_content_length = max_content_length
            .or_else(|| env_number::<usize, _>(&env, MAX_CONTENT_LENGTH_ENV))
            .unwrap_or(defaults.max_content_length);

        Self {
            // Zero means "no deadline", same as leaving it unset.
            read_timeout: read_timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            max_content_length,
        }
    }
}

fn env_number<T, F>(env: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {key}={raw:?}");
            None
        }
    }
}
