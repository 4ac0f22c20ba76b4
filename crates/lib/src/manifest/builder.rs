//! Building a manifest from a commit's tree.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::{Application, Applications};
use crate::consts::{DESCRIPTOR_FILE, TREE_PATH_SEPARATOR};
use crate::descriptor::{self, DescriptorError};
use crate::git::{CommitRef, GitError, Repository, WalkAction};
use crate::resolve::{ResolveError, ResolveOptions};

use super::{Manifest, SkippedDescriptor};

/// Why a single descriptor could not become an application.
#[derive(Debug, Error)]
enum DescriptorFailure {
  #[error("{0}")]
  Lookup(#[source] GitError),

  #[error("{0}")]
  Parse(#[source] DescriptorError),
}

/// Discover every application in `commit` and return them as a manifest.
///
/// Each blob named `.mbt.yml` marks its enclosing directory as an
/// application. Its version is the id of that directory's tree, or the
/// commit id for a descriptor at the repository root, so an application
/// keeps its version across commits that leave its directory untouched.
///
/// A descriptor that cannot be read or parsed is recorded in
/// [`Manifest::skipped`] and the walk continues, unless
/// [`ResolveOptions::strict`] is set.
///
/// # Errors
///
/// Returns [`ResolveError::RepositoryAccess`] if the tree cannot be walked,
/// and in strict mode the error of the first failing descriptor.
pub fn build_manifest<R: Repository + ?Sized>(
  repo: &R,
  dir: &Path,
  commit: &CommitRef,
  options: &ResolveOptions,
) -> Result<Manifest, ResolveError> {
  let access_error = |source: GitError| ResolveError::RepositoryAccess {
    dir: dir.to_path_buf(),
    source,
  };

  let mut descriptors = Vec::new();
  repo
    .walk_tree(commit, &mut |prefix, entry| {
      if entry.is_blob() && entry.name == DESCRIPTOR_FILE {
        let path = prefix.trim_end_matches(TREE_PATH_SEPARATOR).to_string();
        descriptors.push((path, entry.id.clone()));
      }
      WalkAction::Continue
    })
    .map_err(access_error)?;

  let mut applications = Vec::with_capacity(descriptors.len());
  let mut skipped = Vec::new();

  for (path, blob) in descriptors {
    match load_application(repo, commit, &path, &blob) {
      Ok(app) => {
        debug!(path = %path, name = %app.name, version = %app.version, "found application");
        applications.push(app);
      }
      Err(failure) if options.strict => {
        return Err(match failure {
          DescriptorFailure::Lookup(source) => access_error(source),
          DescriptorFailure::Parse(source) => ResolveError::MalformedDescriptor { path, source },
        });
      }
      Err(failure) => {
        warn!(path = %path, error = %failure, "skipping descriptor");
        skipped.push(SkippedDescriptor {
          path,
          reason: failure.to_string(),
        });
      }
    }
  }

  skipped.sort_by(|a, b| a.path.cmp(&b.path));
  let applications = Applications::from(applications);

  info!(
    commit = %commit.sha,
    applications = applications.len(),
    skipped = skipped.len(),
    "built manifest"
  );

  Ok(Manifest {
    dir: dir.to_path_buf(),
    sha: commit.sha.clone(),
    applications,
    skipped,
  })
}

fn load_application<R: Repository + ?Sized>(
  repo: &R,
  commit: &CommitRef,
  path: &str,
  blob: &str,
) -> Result<Application, DescriptorFailure> {
  let content = repo.read_blob(blob).map_err(DescriptorFailure::Lookup)?;

  let version = if path.is_empty() {
    commit.sha.clone()
  } else {
    repo
      .entry_by_path(commit, path)
      .map_err(DescriptorFailure::Lookup)?
      .id
  };

  let spec = descriptor::parse(&content).map_err(DescriptorFailure::Parse)?;
  Ok(Application::new(path, version, spec))
}
