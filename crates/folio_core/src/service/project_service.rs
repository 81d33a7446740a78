//! Project catalog use-case service.
//!
//! # Responsibility
//! - Give callers a stable, named surface over the project aggregate.
//! - Delegate every invariant to the repository implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Repository errors are returned verbatim, never wrapped or translated.
//! - Service layer remains storage-agnostic.

use crate::model::project::{ProjectId, ProjectInsert, ProjectUpdate, ProjectWithRelations};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::project_repo::ProjectRepository;
use log::warn;

/// Number of featured projects returned when callers pass no limit.
pub const DEFAULT_FEATURED_LIMIT: u32 = 3;

/// Use-case service wrapper for project aggregate operations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the full catalog, featured projects first.
    pub fn list_projects(&self) -> RepoResult<Vec<ProjectWithRelations>> {
        self.repo.list()
    }

    /// Lists featured projects, `DEFAULT_FEATURED_LIMIT` when `limit` is `None`.
    pub fn list_featured_projects(
        &self,
        limit: Option<u32>,
    ) -> RepoResult<Vec<ProjectWithRelations>> {
        self.repo.list_featured(limit.unwrap_or(DEFAULT_FEATURED_LIMIT))
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<ProjectWithRelations>> {
        self.repo.get_by_id(id)
    }

    pub fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<ProjectWithRelations>> {
        self.repo.get_by_slug(slug)
    }

    /// Filters the catalog by category slug. Unknown slugs yield an empty list.
    pub fn filter_by_category(&self, category_slug: &str) -> RepoResult<Vec<ProjectWithRelations>> {
        self.repo.list_by_category_slug(category_slug)
    }

    /// Creates a project and returns the committed aggregate.
    ///
    /// # Errors
    /// - `FeaturedLimitExceeded` when featuring would exceed the cap.
    /// - `Validation` for blank titles.
    /// - `Db` for store failures such as unknown skill/category ids.
    pub fn create_project(&self, input: &ProjectInsert) -> RepoResult<ProjectWithRelations> {
        self.repo
            .create(input)
            .inspect_err(|err| log_write_failure("project_create", None, err))
    }

    /// Applies a sparse patch and returns the committed aggregate.
    ///
    /// # Errors
    /// - `ProjectNotFound` when `id` does not exist.
    /// - `FeaturedLimitExceeded` when featuring would exceed the cap.
    /// - `Validation` for blank titles.
    /// - `Db` for store failures.
    pub fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectUpdate,
    ) -> RepoResult<ProjectWithRelations> {
        self.repo
            .update(id, patch)
            .inspect_err(|err| log_write_failure("project_update", Some(id), err))
    }

    /// Deletes a project together with its skill/category links.
    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo
            .delete(id)
            .inspect_err(|err| log_write_failure("project_delete", Some(id), err))
    }
}

fn log_write_failure(event: &str, id: Option<ProjectId>, err: &RepoError) {
    let project_id = id.map_or_else(|| "new".to_string(), |value| value.to_string());
    warn!(
        "event={} module=service status=error project_id={} error_code={} error={}",
        event,
        project_id,
        error_code(err),
        err
    );
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::ProjectNotFound(_) => "not_found",
        RepoError::FeaturedLimitExceeded { .. } => "featured_limit_exceeded",
        RepoError::Db(_) => "transaction_failure",
        _ => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::{error_code, ProjectService, DEFAULT_FEATURED_LIMIT};
    use crate::model::project::{ProjectId, ProjectInsert, ProjectUpdate, ProjectWithRelations};
    use crate::repo::error::{RepoError, RepoResult};
    use crate::repo::project_repo::ProjectRepository;
    use std::cell::RefCell;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingRepo {
        featured_limits: RefCell<Vec<u32>>,
    }

    impl ProjectRepository for RecordingRepo {
        fn list(&self) -> RepoResult<Vec<ProjectWithRelations>> {
            Ok(Vec::new())
        }

        fn list_featured(&self, limit: u32) -> RepoResult<Vec<ProjectWithRelations>> {
            self.featured_limits.borrow_mut().push(limit);
            Ok(Vec::new())
        }

        fn get_by_id(&self, _id: ProjectId) -> RepoResult<Option<ProjectWithRelations>> {
            Ok(None)
        }

        fn get_by_slug(&self, _slug: &str) -> RepoResult<Option<ProjectWithRelations>> {
            Ok(None)
        }

        fn list_by_category_slug(&self, _slug: &str) -> RepoResult<Vec<ProjectWithRelations>> {
            Ok(Vec::new())
        }

        fn create(&self, _input: &ProjectInsert) -> RepoResult<ProjectWithRelations> {
            Err(RepoError::FeaturedLimitExceeded { limit: 6 })
        }

        fn update(
            &self,
            id: ProjectId,
            _patch: &ProjectUpdate,
        ) -> RepoResult<ProjectWithRelations> {
            Err(RepoError::ProjectNotFound(id))
        }

        fn delete(&self, id: ProjectId) -> RepoResult<()> {
            Err(RepoError::ProjectNotFound(id))
        }
    }

    #[test]
    fn featured_limit_defaults_to_three() {
        let service = ProjectService::new(RecordingRepo::default());
        service.list_featured_projects(None).unwrap();
        service.list_featured_projects(Some(5)).unwrap();
        assert_eq!(
            *service.repo.featured_limits.borrow(),
            vec![DEFAULT_FEATURED_LIMIT, 5]
        );
    }

    #[test]
    fn repository_errors_pass_through_unchanged() {
        let service = ProjectService::new(RecordingRepo::default());
        let id = Uuid::new_v4();

        let create_err = service
            .create_project(&ProjectInsert::new("Seventh"))
            .unwrap_err();
        assert!(matches!(
            create_err,
            RepoError::FeaturedLimitExceeded { limit: 6 }
        ));

        let update_err = service
            .update_project(id, &ProjectUpdate::default())
            .unwrap_err();
        assert!(matches!(update_err, RepoError::ProjectNotFound(missing) if missing == id));

        let delete_err = service.delete_project(id).unwrap_err();
        assert!(matches!(delete_err, RepoError::ProjectNotFound(missing) if missing == id));
    }

    #[test]
    fn error_codes_cover_the_write_taxonomy() {
        let id = Uuid::new_v4();
        assert_eq!(error_code(&RepoError::ProjectNotFound(id)), "not_found");
        assert_eq!(
            error_code(&RepoError::FeaturedLimitExceeded { limit: 6 }),
            "featured_limit_exceeded"
        );
    }
}
