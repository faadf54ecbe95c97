use sea_orm::DbErr;
use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by entity stores and the unit of work.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Sort column is not registered for the entity. Raised when the query
    /// runs, not when the list request is bound.
    #[error("unknown sort column `{column}` for {entity}")]
    InvalidSortColumn { entity: String, column: String },
    /// `single_matching` found more than one row.
    #[error("expected at most one {entity} row, found several")]
    MultipleResults { entity: String },
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl RepositoryError {
    /// Caller supplied something the query cannot run with.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, RepositoryError::InvalidSortColumn { .. })
    }
}
