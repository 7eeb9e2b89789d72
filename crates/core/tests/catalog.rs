//! Branch snapshots taken from a real repository.

mod common;

use common::TestRepo;
use gitsmash_core::errors::CatalogError;
use gitsmash_core::BranchCatalog;

#[test]
fn test_snapshot_keeps_first_listed_branch_intact() {
    require_git!();
    let repo = TestRepo::new();
    repo.git(&["branch", "aa/feat"]);
    repo.git(&["branch", "bb/feat"]);
    repo.branch("zz/work", "master");

    let catalog = BranchCatalog::snapshot(&repo.client()).unwrap();
    let names: Vec<&str> = catalog.branches().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["aa/feat", "bb/feat", "master", "zz/work"]);
    assert_eq!(catalog.current().unwrap().name, "zz/work");

    assert!(matches!(
        catalog.best_match("feat"),
        Err(CatalogError::AmbiguousMatch { .. })
    ));
}

#[test]
fn test_snapshot_with_current_branch_first() {
    require_git!();
    let repo = TestRepo::new();
    repo.git(&["branch", "topic"]);

    let catalog = BranchCatalog::snapshot(&repo.client()).unwrap();
    let names: Vec<&str> = catalog.branches().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["master", "topic"]);
    assert_eq!(catalog.current().unwrap().name, "master");
}
