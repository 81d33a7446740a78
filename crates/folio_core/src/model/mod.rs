//! Domain model for the portfolio project catalog.
//!
//! # Responsibility
//! - Define project aggregate and taxonomy records used by repositories.
//! - Own input validation that must pass before any SQL mutation.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Slugs are derived, never caller-supplied.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod project;
pub mod taxonomy;

/// Input validation failures raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Project title is empty after trim.
    BlankTitle,
    /// Skill/category name is empty after trim.
    BlankName,
    /// `LANGUAGE` skills cannot belong to a category.
    LanguageWithCategory,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "project title must not be blank"),
            Self::BlankName => write!(f, "name must not be blank"),
            Self::LanguageWithCategory => {
                write!(f, "language skills cannot belong to a category")
            }
        }
    }
}

impl Error for ValidationError {}
