//! Database models for BlogForge
//!
//! Each model carries its row type, its input/change-set types and the
//! PostgreSQL queries that read and write it. Higher layers reach these
//! through the [`crate::store`] traits rather than calling them directly.
//!
//! # Models
//!
//! - `user`: accounts, roles and credentials
//! - `article`: articles, listing filters and counters
//! - `category`: article categories
//! - `tag`: tags and the article/tag association
//! - `comment`: threaded, soft-deleted comments

pub mod article;
pub mod category;
pub mod comment;
pub mod tag;
pub mod user;
