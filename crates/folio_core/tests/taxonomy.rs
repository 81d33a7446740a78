use folio_core::db::open_db_in_memory;
use folio_core::{
    CategoryRepository, NewCategory, NewSkill, RepoError, SkillRepository, SkillType,
    SqliteCategoryRepository, SqliteSkillRepository, ValidationError,
};
use uuid::Uuid;

#[test]
fn category_create_derives_slug_and_defaults_visible() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let created = repo
        .create_category(&NewCategory {
            description: Some("Servers and storage".to_string()),
            ..NewCategory::new("  Back End Systems ")
        })
        .unwrap();
    assert_eq!(created.name, "Back End Systems");
    assert_eq!(created.slug, "back-end-systems");
    assert!(created.is_visible);

    let by_id = repo.get_category(created.id).unwrap().unwrap();
    assert_eq!(by_id, created);
    let by_slug = repo.get_category_by_slug("back-end-systems").unwrap().unwrap();
    assert_eq!(by_slug, created);
    assert!(repo.get_category_by_slug("frontend").unwrap().is_none());
}

#[test]
fn categories_list_by_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    for name in ["web", "Backend", "Mobile"] {
        repo.create_category(&NewCategory::new(name)).unwrap();
    }

    let names: Vec<String> = repo
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Backend", "Mobile", "web"]);
}

#[test]
fn category_delete_reports_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    let created = repo.create_category(&NewCategory::new("Temporary")).unwrap();

    repo.delete_category(created.id).unwrap();
    assert!(repo.get_category(created.id).unwrap().is_none());
    let err = repo.delete_category(created.id).unwrap_err();
    assert!(matches!(err, RepoError::CategoryNotFound(id) if id == created.id));
}

#[test]
fn category_names_only_need_to_be_non_blank() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let cyrillic = repo.create_category(&NewCategory::new("Игры")).unwrap();
    assert_eq!(cyrillic.name, "Игры");
    assert_eq!(cyrillic.slug, "");

    let err = repo.create_category(&NewCategory::new("  ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankName)
    ));
    assert_eq!(repo.list_categories().unwrap().len(), 1);
}

#[test]
fn skill_round_trips_type_icon_and_category() {
    let conn = open_db_in_memory().unwrap();
    let category = SqliteCategoryRepository::try_new(&conn)
        .unwrap()
        .create_category(&NewCategory::new("Databases"))
        .unwrap();
    let repo = SqliteSkillRepository::try_new(&conn).unwrap();

    let created = repo
        .create_skill(&NewSkill {
            icon: Some("postgresql".to_string()),
            category_id: Some(category.id),
            ..NewSkill::new("PostgreSQL", SkillType::Technology)
        })
        .unwrap();
    assert_eq!(created.slug, "postgresql");

    let loaded = repo.get_skill(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.skill_type, SkillType::Technology);
    assert_eq!(loaded.category_id, Some(category.id));
}

#[test]
fn language_skill_with_category_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let category = SqliteCategoryRepository::try_new(&conn)
        .unwrap()
        .create_category(&NewCategory::new("Systems"))
        .unwrap();
    let repo = SqliteSkillRepository::try_new(&conn).unwrap();

    let err = repo
        .create_skill(&NewSkill {
            category_id: Some(category.id),
            ..NewSkill::new("Rust", SkillType::Language)
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::LanguageWithCategory)
    ));
    assert!(repo.list_skills().unwrap().is_empty());
}

#[test]
fn skill_with_unknown_category_fails_in_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSkillRepository::try_new(&conn).unwrap();

    let err = repo
        .create_skill(&NewSkill {
            category_id: Some(Uuid::new_v4()),
            ..NewSkill::new("Axum", SkillType::Technology)
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn skills_list_by_name_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSkillRepository::try_new(&conn).unwrap();
    let go = repo
        .create_skill(&NewSkill::new("Go", SkillType::Language))
        .unwrap();
    repo.create_skill(&NewSkill::new("docker", SkillType::Technology))
        .unwrap();
    repo.create_skill(&NewSkill::new("Elixir", SkillType::Language))
        .unwrap();

    let names: Vec<String> = repo
        .list_skills()
        .unwrap()
        .into_iter()
        .map(|skill| skill.name)
        .collect();
    assert_eq!(names, vec!["docker", "Elixir", "Go"]);

    repo.delete_skill(go.id).unwrap();
    assert_eq!(repo.list_skills().unwrap().len(), 2);
    let err = repo.delete_skill(go.id).unwrap_err();
    assert!(matches!(err, RepoError::SkillNotFound(_)));
}
