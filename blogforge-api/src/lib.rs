//! # BlogForge API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and response mapping
//! - `response`: Success envelope
//! - `extract`: Extractors rejecting into the envelope
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber setup

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod telemetry;
