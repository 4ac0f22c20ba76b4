//! Resolution strategies over real repositories.

use mbt_lib::git::{GixRepository, Repository};
use mbt_lib::{
  Manifest, ResolveError, ResolveOptions, manifest_by_branch, manifest_by_diff, manifest_by_pr, manifest_by_sha,
};

use super::common::{API, GitFixture, WORKER};

fn names(manifest: &Manifest) -> Vec<&str> {
  manifest.applications.iter().map(|a| a.name.as_str()).collect()
}

/// `master` holds api and worker; `feature` changes worker only.
fn feature_repo() -> (GitFixture, String, String) {
  let repo = GitFixture::new();
  repo.write("services/api/.mbt.yml", API);
  repo.write("services/worker/.mbt.yml", WORKER);
  repo.write("services/worker/main", "v1");
  let c1 = repo.commit("initial");

  repo.git(&["checkout", "-q", "-b", "feature"]);
  repo.write("services/worker/main", "v2");
  let c2 = repo.commit("change worker");
  repo.git(&["checkout", "-q", "master"]);

  (repo, c1, c2)
}

#[test]
fn empty_repository_yields_empty_manifest_for_every_strategy() {
  let repo = GitFixture::new();
  let options = ResolveOptions::default();

  let results = [
    manifest_by_sha(repo.path(), "0000000000000000000000000000000000000000", &options).unwrap(),
    manifest_by_branch(repo.path(), "master", &options).unwrap(),
    manifest_by_pr(repo.path(), "feature", "master", &options).unwrap(),
    manifest_by_diff(repo.path(), "a", "b", &options).unwrap(),
  ];

  for manifest in results {
    assert_eq!(manifest.sha, "");
    assert!(manifest.applications.is_empty());
    assert_eq!(manifest.dir, repo.path());
  }
}

#[test]
fn diff_between_commits_selects_changed_application() {
  let (repo, c1, c2) = feature_repo();

  let manifest = manifest_by_diff(repo.path(), &c1, &c2, &ResolveOptions::default()).unwrap();

  assert_eq!(manifest.sha, c2);
  assert_eq!(names(&manifest), vec!["worker"]);
  assert_eq!(manifest.applications.as_slice()[0].version, repo.object_id(&c2, "services/worker"));
}

#[cfg(unix)]
#[test]
fn mode_only_change_selects_owning_application() {
  let (repo, _, _) = feature_repo();
  repo.git(&["checkout", "-q", "feature"]);
  repo.write("services/worker/build.sh", "make");
  let c3 = repo.commit("add build script");
  repo.make_executable("services/worker/build.sh");
  let c4 = repo.commit("make build script executable");

  let manifest = manifest_by_diff(repo.path(), &c3, &c4, &ResolveOptions::default()).unwrap();
  assert_eq!(names(&manifest), vec!["worker"]);

  let backend = GixRepository::open(repo.path()).unwrap();
  let head = backend.commit_by_sha(&c4).unwrap();
  let base = backend.commit_by_sha(&c3).unwrap();
  assert_eq!(
    backend.merge_base_diff(&head, &base).unwrap(),
    vec!["services/worker/build.sh"]
  );
}

#[cfg(unix)]
#[test]
fn file_replaced_by_symlink_with_same_content_selects_owning_application() {
  let (repo, c1, _) = feature_repo();
  repo.write("services/api/current", "handler");
  repo.write("services/api/handler", "code");
  let c2 = repo.commit("add current");
  repo.symlink("services/api/current", "handler");
  let c3 = repo.commit("turn current into a symlink");

  assert_eq!(
    repo.object_id(&c2, "services/api/current"),
    repo.object_id(&c3, "services/api/current")
  );

  let manifest = manifest_by_diff(repo.path(), &c2, &c3, &ResolveOptions::default()).unwrap();
  assert_eq!(names(&manifest), vec!["api"]);

  let manifest = manifest_by_diff(repo.path(), &c1, &c3, &ResolveOptions::default()).unwrap();
  assert_eq!(names(&manifest), vec!["api"]);
}

#[test]
fn head_on_missing_branch_is_not_an_empty_repository() {
  let (repo, c1, c2) = feature_repo();
  repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
  let options = ResolveOptions::default();

  let backend = GixRepository::open(repo.path()).unwrap();
  assert!(!backend.is_empty().unwrap());

  let manifest = manifest_by_sha(repo.path(), &c1, &options).unwrap();
  assert_eq!(manifest.sha, c1);
  assert_eq!(names(&manifest), vec!["api", "worker"]);

  let manifest = manifest_by_branch(repo.path(), "feature", &options).unwrap();
  assert_eq!(manifest.sha, c2);

  let err = manifest_by_branch(repo.path(), "main", &options).unwrap_err();
  assert!(matches!(err, ResolveError::ReferenceResolution { .. }));
}

#[test]
fn branch_resolves_to_tip() {
  let (repo, c1, c2) = feature_repo();
  let options = ResolveOptions::default();

  let master = manifest_by_branch(repo.path(), "master", &options).unwrap();
  let feature = manifest_by_branch(repo.path(), "feature", &options).unwrap();

  assert_eq!(master.sha, c1);
  assert_eq!(feature.sha, c2);
  assert_eq!(names(&feature), vec!["api", "worker"]);
}

#[test]
fn pull_request_selects_applications_changed_on_source() {
  let (repo, _, c2) = feature_repo();

  repo.write("services/api/handler", "master only");
  repo.commit("change api on master");

  let manifest = manifest_by_pr(repo.path(), "feature", "master", &ResolveOptions::default()).unwrap();

  assert_eq!(manifest.sha, c2);
  assert_eq!(names(&manifest), vec!["worker"]);
}

#[test]
fn removed_application_is_not_reported() {
  let (repo, c1, _) = feature_repo();
  repo.remove_dir("services/api");
  let c3 = repo.commit("remove api");

  let manifest = manifest_by_diff(repo.path(), &c1, &c3, &ResolveOptions::default()).unwrap();
  assert!(manifest.applications.is_empty());

  let backend = GixRepository::open(repo.path()).unwrap();
  let head = backend.commit_by_sha(&c3).unwrap();
  let base = backend.commit_by_sha(&c1).unwrap();
  assert_eq!(backend.merge_base_diff(&head, &base).unwrap(), vec!["services/api/.mbt.yml"]);
}

#[test]
fn new_application_is_reported() {
  let (repo, c1, _) = feature_repo();
  repo.write("tools/cli/.mbt.yml", "name: cli\n");
  let c3 = repo.commit("add cli");

  let manifest = manifest_by_diff(repo.path(), &c1, &c3, &ResolveOptions::default()).unwrap();
  assert_eq!(names(&manifest), vec!["cli"]);
}

#[test]
fn unknown_references_fail_resolution() {
  let (repo, c1, _) = feature_repo();
  let options = ResolveOptions::default();

  let err = manifest_by_branch(repo.path(), "does-not-exist", &options).unwrap_err();
  assert!(matches!(err, ResolveError::ReferenceResolution { .. }));

  let err = manifest_by_sha(repo.path(), "not-hex", &options).unwrap_err();
  assert!(matches!(err, ResolveError::ReferenceResolution { .. }));

  let missing = "1111111111111111111111111111111111111111";
  let err = manifest_by_diff(repo.path(), &c1, missing, &options).unwrap_err();
  assert!(matches!(err, ResolveError::ReferenceResolution { .. }));
}

#[test]
fn missing_repository_is_access_error() {
  let dir = tempfile::TempDir::new().unwrap();
  let err = manifest_by_branch(dir.path(), "master", &ResolveOptions::default()).unwrap_err();
  assert!(matches!(err, ResolveError::RepositoryAccess { .. }));
}

#[test]
fn gix_backend_walks_and_reads_objects() {
  let (repo, c1, _) = feature_repo();
  let backend = GixRepository::open(repo.path()).unwrap();

  assert!(!backend.is_empty().unwrap());

  let commit = backend.commit_by_sha(&c1).unwrap();
  assert_eq!(commit.tree, repo.object_id(&c1, ""));

  let entry = backend.entry_by_path(&commit, "services/worker/main").unwrap();
  assert!(entry.is_blob());
  assert_eq!(backend.read_blob(&entry.id).unwrap(), b"v1");

  let mut files = Vec::new();
  backend
    .walk_tree(&commit, &mut |prefix, entry| {
      if entry.is_blob() {
        files.push(format!("{}{}", prefix, entry.name));
      }
      mbt_lib::git::WalkAction::Continue
    })
    .unwrap();
  files.sort();
  assert_eq!(
    files,
    vec!["services/api/.mbt.yml", "services/worker/.mbt.yml", "services/worker/main"]
  );
}
