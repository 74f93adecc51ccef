pub mod comment_repository;
#[cfg(test)]
pub mod memory;
#[cfg(test)]
pub mod pg_fixtures;
pub mod post_repository;
pub mod taxonomy_repository;
pub mod user_repository;

use crate::domain::error::DomainError;
use tracing::error;

pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        error!("{}: {}", context, e);
        DomainError::Internal(format!("database error: {}", e))
    }
}
