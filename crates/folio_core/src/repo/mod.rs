//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate inputs before any SQL mutation.
//! - Repository APIs return semantic errors (`ProjectNotFound`,
//!   `FeaturedLimitExceeded`) in addition to DB transport errors.
//! - Repositories refuse connections that are not fully migrated.

pub mod category_repo;
pub mod error;
pub mod project_repo;
pub mod relations;
pub(crate) mod schema;
pub mod skill_repo;
