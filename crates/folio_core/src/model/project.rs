//! Project aggregate model.
//!
//! # Responsibility
//! - Define the project row, its insert/patch inputs and the hydrated
//!   aggregate returned to callers.
//! - Validate title content before any write is attempted.
//!
//! # Invariants
//! - `slug` is always derived from `title`; inputs carry no slug field.
//! - At most `FEATURED_PROJECT_LIMIT` projects are featured at once.
//! - `ProjectUpdate` distinguishes "absent" from "present" for every field;
//!   relation id sets use replace-all semantics when present.

use crate::model::taxonomy::{Category, CategoryId, Skill, SkillId};
use crate::model::ValidationError;
use crate::slug::slugify;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

/// Maximum number of simultaneously featured projects.
pub const FEATURED_PROJECT_LIMIT: usize = 6;

/// Persisted project row without relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub long_description: String,
    pub thumbnail_url: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub docs_url: Option<String>,
    pub video_url: Option<String>,
    pub is_featured: bool,
    pub display_order: i64,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on every update.
    pub updated_at: i64,
}

/// Project plus its skill and category sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWithRelations {
    #[serde(flatten)]
    pub project: Project,
    pub skills: Vec<Skill>,
    pub categories: Vec<Category>,
}

impl ProjectWithRelations {
    /// Returns skill ids in attached order.
    pub fn skill_ids(&self) -> Vec<SkillId> {
        self.skills.iter().map(|skill| skill.id).collect()
    }

    /// Returns category ids in attached order.
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|category| category.id).collect()
    }
}

/// Create input for one project aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectInsert {
    pub title: String,
    pub short_description: String,
    pub long_description: String,
    pub thumbnail_url: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub docs_url: Option<String>,
    pub video_url: Option<String>,
    pub is_featured: bool,
    /// `None` appends the project after the current highest order.
    pub display_order: Option<i64>,
    pub skill_ids: Vec<SkillId>,
    pub category_ids: Vec<CategoryId>,
}

impl ProjectInsert {
    /// Creates an input with the given title and all other fields defaulted.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns the slug this input will be stored under.
    pub fn derived_slug(&self) -> String {
        slugify(&self.title)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

/// Sparse patch for one project aggregate.
///
/// `None` leaves a column unchanged. Nullable columns use a nested option so
/// `Some(None)` clears the stored value. `skill_ids`/`category_ids` set to
/// `Some(vec![])` remove every association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_url: Option<Option<String>>,
    #[serde(
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub demo_url: Option<Option<String>>,
    #[serde(
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub docs_url: Option<Option<String>>,
    #[serde(
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_ids: Option<Vec<SkillId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<CategoryId>>,
}

impl ProjectUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.title.as_deref() {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    /// Returns `true` when no column or relation set is touched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    Ok(())
}

// A key that is present (even as `null`) deserializes to `Some(_)`; missing
// keys fall back to `Default`, i.e. `None`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{ProjectInsert, ProjectUpdate};
    use crate::model::ValidationError;

    #[test]
    fn insert_derives_slug_from_title() {
        let input = ProjectInsert::new("My Cool Project!!");
        assert_eq!(input.derived_slug(), "my-cool-project");
    }

    #[test]
    fn insert_rejects_only_blank_titles() {
        assert_eq!(
            ProjectInsert::new("   ").validate().unwrap_err(),
            ValidationError::BlankTitle
        );
        assert!(ProjectInsert::new("!!!").validate().is_ok());
        let non_latin = ProjectInsert::new("日本語");
        assert!(non_latin.validate().is_ok());
        assert_eq!(non_latin.derived_slug(), "");
    }

    #[test]
    fn update_without_title_is_valid() {
        let patch = ProjectUpdate {
            display_order: Some(2),
            ..ProjectUpdate::default()
        };
        assert!(patch.validate().is_ok());
        assert!(!patch.is_empty());
        assert!(ProjectUpdate::default().is_empty());
    }
}
