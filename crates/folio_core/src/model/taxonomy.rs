//! Skill and category taxonomy model.
//!
//! # Responsibility
//! - Define skill/category records referenced by projects.
//! - Validate the skill type/category pairing before persistence.
//!
//! # Invariants
//! - A `SkillType::Language` skill never carries a `category_id`.
//! - Slugs are derived from names and never supplied by callers.

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable skill identifier.
pub type SkillId = Uuid;

/// Stable category identifier.
pub type CategoryId = Uuid;

/// Skill classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillType {
    /// Programming language. Never grouped under a category.
    Language,
    /// Framework, library, tool or platform.
    Technology,
}

impl SkillType {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            Self::Language => "LANGUAGE",
            Self::Technology => "TECHNOLOGY",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "LANGUAGE" => Some(Self::Language),
            "TECHNOLOGY" => Some(Self::Technology),
            _ => None,
        }
    }
}

/// Persisted skill row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub skill_type: SkillType,
    /// Icon reference (name or path), rendered by callers.
    pub icon: Option<String>,
    /// Owning category. Always `None` for languages.
    pub category_id: Option<CategoryId>,
}

/// Insert model for skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSkill {
    pub name: String,
    #[serde(rename = "type")]
    pub skill_type: SkillType,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl NewSkill {
    /// Creates a skill input without icon or category.
    pub fn new(name: impl Into<String>, skill_type: SkillType) -> Self {
        Self {
            name: name.into(),
            skill_type,
            icon: None,
            category_id: None,
        }
    }

    /// Validates name content and the language/category pairing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        if self.skill_type == SkillType::Language && self.category_id.is_some() {
            return Err(ValidationError::LanguageWithCategory);
        }
        Ok(())
    }
}

/// Persisted category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_visible: bool,
}

/// Insert model for categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

impl NewCategory {
    /// Creates a visible category input without description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_visible: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        Ok(())
    }
}

fn default_visible() -> bool {
    true
}
