//! Business flows on top of the store
//!
//! - `account`: registration, login, token refresh, profile and password
//! - `articles`: the article query engine and article mutations
//! - `categories` / `tags`: guarded create/update/delete
//! - `comments`: threaded comments with soft delete
//!
//! Every flow returns [`ServiceError`]; the HTTP layer maps each variant to
//! an in-body response code.

use serde::Serialize;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

pub mod account;
pub mod articles;
pub mod categories;
pub mod comments;
pub mod tags;

pub use account::AccountService;
pub use articles::ArticleService;
pub use categories::CategoryService;
pub use comments::CommentService;
pub use tags::TagService;

/// Errors surfaced by the service layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    /// Same message for unknown user and wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Old password is incorrect")]
    WrongPassword,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} name already exists")]
    DuplicateName(&'static str),

    #[error("Category is still used by articles")]
    InUse,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Default page size when the caller gives none
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size served
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamped page request
///
/// `page` is at least 1 and `size` lies in `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results, serialized as `{list, total, page, size}`
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}
