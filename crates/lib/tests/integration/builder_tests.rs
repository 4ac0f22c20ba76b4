//! Manifest building over real commits.

use mbt_lib::descriptor::BuildCommand;
use mbt_lib::{ResolveError, ResolveOptions, manifest_by_sha};

use super::common::{API, GitFixture, WORKER};

fn paths(manifest: &mbt_lib::Manifest) -> Vec<&str> {
  manifest.applications.iter().map(|a| a.path.as_str()).collect()
}

#[test]
fn two_services_are_found_and_versioned_by_subtree() {
  let repo = GitFixture::new();
  repo.write("services/api/.mbt.yml", API);
  repo.write("services/worker/.mbt.yml", WORKER);
  repo.write("services/worker/main", "v1");
  repo.write("README.md", "monorepo");
  let c1 = repo.commit("initial");

  let manifest = manifest_by_sha(repo.path(), &c1, &ResolveOptions::default()).unwrap();

  assert_eq!(manifest.sha, c1);
  assert_eq!(manifest.dir, repo.path());
  assert_eq!(paths(&manifest), vec!["services/api", "services/worker"]);

  let apps = manifest.applications.as_slice();
  assert_eq!(apps[0].name, "api");
  assert_eq!(apps[0].version, repo.object_id(&c1, "services/api"));
  assert_eq!(
    apps[0].build["default"],
    BuildCommand {
      cmd: "make".to_string(),
      args: vec!["build".to_string()],
    }
  );
  assert_eq!(apps[1].name, "worker");
  assert_eq!(apps[1].version, repo.object_id(&c1, "services/worker"));
  assert_eq!(apps[1].properties["queue"], serde_yaml::Value::from("jobs"));
}

#[test]
fn root_descriptor_is_versioned_by_commit() {
  let repo = GitFixture::new();
  repo.write(".mbt.yml", "name: monorepo\n");
  repo.write("lib/.mbt.yml", "name: lib\n");
  let sha = repo.commit("initial");

  let manifest = manifest_by_sha(repo.path(), &sha, &ResolveOptions::default()).unwrap();

  assert_eq!(paths(&manifest), vec!["", "lib"]);
  assert_eq!(manifest.applications.as_slice()[0].version, sha);
  assert_eq!(manifest.applications.as_slice()[1].version, repo.object_id(&sha, "lib"));
}

#[test]
fn version_survives_unrelated_commits() {
  let repo = GitFixture::new();
  repo.write("services/api/.mbt.yml", API);
  repo.write("services/worker/.mbt.yml", WORKER);
  repo.write("services/worker/main", "v1");
  let c1 = repo.commit("initial");
  repo.write("services/worker/main", "v2");
  let c2 = repo.commit("touch worker");

  let options = ResolveOptions::default();
  let m1 = manifest_by_sha(repo.path(), &c1, &options).unwrap();
  let m2 = manifest_by_sha(repo.path(), &c2, &options).unwrap();

  assert_eq!(m1.by_name()["api"].version, m2.by_name()["api"].version);
  assert_ne!(m1.by_name()["worker"].version, m2.by_name()["worker"].version);
}

#[test]
fn broken_descriptor_is_skipped() {
  let repo = GitFixture::new();
  repo.write("services/api/.mbt.yml", API);
  repo.write("services/broken/.mbt.yml", "name: [oops\n");
  repo.write("services/worker/.mbt.yml", WORKER);
  let sha = repo.commit("initial");

  let manifest = manifest_by_sha(repo.path(), &sha, &ResolveOptions::default()).unwrap();

  assert_eq!(paths(&manifest), vec!["services/api", "services/worker"]);
  assert_eq!(manifest.skipped.len(), 1);
  assert_eq!(manifest.skipped[0].path, "services/broken");
}

#[test]
fn broken_descriptor_fails_in_strict_mode() {
  let repo = GitFixture::new();
  repo.write("services/broken/.mbt.yml", "name: [oops\n");
  let sha = repo.commit("initial");

  let err = manifest_by_sha(repo.path(), &sha, &ResolveOptions { strict: true }).unwrap_err();
  assert!(matches!(err, ResolveError::MalformedDescriptor { .. }));
}

#[test]
fn deeply_nested_applications_are_found() {
  let repo = GitFixture::new();
  repo.write("a/b/c/d/.mbt.yml", "name: deep\n");
  repo.write("a/.mbt.yml", "name: shallow\n");
  let sha = repo.commit("nested");

  let manifest = manifest_by_sha(repo.path(), &sha, &ResolveOptions::default()).unwrap();

  assert_eq!(paths(&manifest), vec!["a", "a/b/c/d"]);
  assert_eq!(manifest.by_name()["deep"].version, repo.object_id(&sha, "a/b/c/d"));
}
