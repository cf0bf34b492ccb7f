//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: token issuance and validation ([`jwt::TokenService`])
//! - [`middleware`]: the Axum auth gate binding an [`middleware::AuthContext`]
//! - [`authorization`]: the role gate for privileged routes

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
