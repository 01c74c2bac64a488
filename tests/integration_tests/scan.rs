//! Discovery tests against real repositories.

use git_drift::scan::find_repositories;

use crate::common::TestRepo;

#[test]
fn test_discovers_working_copy_but_not_bare_remote() {
    let repo = TestRepo::new();
    repo.commit("one");
    repo.add_origin();
    repo.push();

    // The bare origin.git sits next to the working copy but has no .git
    // directory of its own, so only the working copy is a repository.
    let repos = find_repositories(repo.scan_root());
    assert_eq!(repos.len(), 1);
    assert!(repos[0].ends_with("work"));
}

#[test]
fn test_plain_directories_are_ignored() {
    let repo = TestRepo::new();
    repo.commit("one");
    std::fs::create_dir_all(repo.scan_root().join("notes/2026")).unwrap();

    let repos = find_repositories(repo.scan_root());
    assert_eq!(repos.len(), 1);
}
