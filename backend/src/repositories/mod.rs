//! Database repositories
//!
//! Provides data access layer for database operations. Each repository is a
//! trait with a PostgreSQL implementation; services receive them as trait
//! objects through `AppState`.

pub mod product;
pub mod user;

#[cfg(test)]
pub mod memory;

use thiserror::Error;

pub use product::{
    NewProduct, PgProductRepository, ProductChanges, ProductRecord, ProductRepository,
};
pub use user::{NewUser, PgUserRepository, UserChanges, UserRecord, UserRepository};

/// Errors surfaced by repositories
#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique constraint rejected the write; carries the offending field
    #[error("{0} already exists")]
    UniqueViolation(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// Classify a write error, turning unique constraint violations into
    /// [`RepoError::UniqueViolation`] for the given field
    pub(crate) fn on_write(err: sqlx::Error, field: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::UniqueViolation(field)
            }
            _ => RepoError::Database(err),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Result of pointing a record at a new image
#[derive(Debug, Clone)]
pub struct ImageSwap<T> {
    /// The row after the update
    pub record: T,
    /// Path the row held immediately before this update
    pub replaced: Option<String>,
}

