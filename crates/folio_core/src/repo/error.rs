//! Repository error taxonomy.
//!
//! # Invariants
//! - Store failures surface as `Db` unchanged; the open transaction has
//!   already rolled back when the error reaches the caller.
//! - Semantic failures (`ProjectNotFound`, `FeaturedLimitExceeded`) abort
//!   before or inside the transaction, never after commit.

use crate::db::DbError;
use crate::model::project::ProjectId;
use crate::model::taxonomy::{CategoryId, SkillId};
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for project aggregate and taxonomy persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before any SQL mutation.
    Validation(ValidationError),
    /// Underlying SQLite failure, including constraint violations.
    Db(DbError),
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// Target skill does not exist.
    SkillNotFound(SkillId),
    /// Target category does not exist.
    CategoryNotFound(CategoryId),
    /// Write would push the featured project count above `limit`.
    FeaturedLimitExceeded { limit: usize },
    /// Persisted row cannot be decoded into the read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::SkillNotFound(id) => write!(f, "skill not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::FeaturedLimitExceeded { limit } => {
                write!(f, "featured project limit of {limit} reached")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
