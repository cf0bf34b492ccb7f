//! Redis integration
//!
//! Only connection management and health checks; no cache or session state
//! lives in Redis.

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
