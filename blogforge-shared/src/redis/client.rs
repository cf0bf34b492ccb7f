//! Redis connection used for health reporting
//!
//! `ConnectionManager` reconnects on its own, so a Redis restart shows up as
//! a few unhealthy health checks rather than a dead client.

use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedisClientError {
    #[error("Invalid Redis URL: {0}")]
    InvalidUrl(String),

    #[error("Redis connection error: {0}")]
    Connection(String),

    #[error("Redis ping failed: {0}")]
    Ping(String),
}

impl From<RedisError> for RedisClientError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error() || err.is_timeout() {
            RedisClientError::Connection(err.to_string())
        } else {
            RedisClientError::Ping(err.to_string())
        }
    }
}

/// The `redis` section of the server config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// `redis://[user:password@]host:port[/db]`
    pub url: String,
    pub connection_timeout_secs: u64,
    /// Upper bound for a health-check PING
    pub command_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout_secs: 5,
            command_timeout_secs: 10,
        }
    }
}

#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    ping_timeout: Duration,
}

impl RedisClient {
    /// Connects, giving up after `connection_timeout_secs`
    pub async fn new(config: RedisConfig) -> Result<Self, RedisClientError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RedisClientError::InvalidUrl(e.to_string()))?;

        let manager = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout_secs),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| RedisClientError::Connection("timed out".to_string()))??;

        tracing::info!(url = %redact(&config.url), "Connected to Redis");

        Ok(Self {
            manager,
            ping_timeout: Duration::from_secs(config.command_timeout_secs),
        })
    }

    /// Round-trips a PING
    pub async fn ping(&self) -> Result<(), RedisClientError> {
        let mut conn = self.manager.clone();

        let reply: String = tokio::time::timeout(
            self.ping_timeout,
            redis::cmd("PING").query_async(&mut conn),
        )
        .await
        .map_err(|_| RedisClientError::Ping("timed out".to_string()))??;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(RedisClientError::Ping(format!("unexpected reply {:?}", reply)))
        }
    }

    /// `true` when a PING succeeds; failures are logged, not returned
    pub async fn is_healthy(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Redis health check failed");
                false
            }
        }
    }
}

/// Hides credentials in a connection URL
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***@{}", &url[..scheme_end + 3], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
