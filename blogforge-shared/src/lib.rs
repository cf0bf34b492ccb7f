//! # BlogForge Shared Library
//!
//! Domain types, storage and business flows used by the BlogForge API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database rows and their SQL
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `auth`: Tokens, password hashing, auth and role gates
//! - `services`: Account, article, category, tag and comment flows
//! - `upload`: Upload storage on the local filesystem
//! - `db`: Connection pool and migrations
//! - `redis`: Redis client

pub mod auth;
pub mod db;
pub mod models;
pub mod redis;
pub mod services;
pub mod store;
pub mod upload;

/// Current version of the BlogForge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
