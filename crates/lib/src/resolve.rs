//! Resolution strategies.
//!
//! Four ways to ask "which applications?":
//! - by commit id ([`manifest_by_sha`])
//! - by branch tip ([`manifest_by_branch`])
//! - by the changes of a branch against another, as in a pull request
//!   ([`manifest_by_pr`])
//! - by the changes between two commits ([`manifest_by_diff`])
//!
//! The diff-based strategies build the manifest on the head side and keep
//! only the applications touched since the merge base. Every strategy
//! returns an empty manifest for a repository without commits.
//!
//! Each call opens its own repository handle. The same strategies work on
//! any [`Repository`] through [`Resolver`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::descriptor::DescriptorError;
use crate::git::{CommitRef, GitError, GixRepository, Repository};
use crate::manifest::{Manifest, build_manifest, reduce_to_diff};

/// Errors that abort a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The repository could not be opened or read.
  #[error("failed to access repository at '{}': {source}", dir.display())]
  RepositoryAccess {
    dir: PathBuf,
    #[source]
    source: GitError,
  },

  /// A branch or commit id does not resolve to a commit.
  #[error("failed to resolve '{reference}': {source}")]
  ReferenceResolution {
    reference: String,
    #[source]
    source: GitError,
  },

  /// A descriptor failed to parse while running in strict mode.
  #[error("malformed descriptor in '{path}': {source}")]
  MalformedDescriptor {
    path: String,
    #[source]
    source: DescriptorError,
  },

  /// The merge base or the diff against it could not be computed.
  #[error("failed to diff '{head}' against '{base}': {source}")]
  DiffComputation {
    head: String,
    base: String,
    #[source]
    source: GitError,
  },
}

/// Options shared by all strategies.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
  /// Fail on the first descriptor that cannot be loaded instead of skipping it.
  pub strict: bool,
}

/// Runs the resolution strategies against an open repository.
pub struct Resolver<'a, R: Repository + ?Sized> {
  repo: &'a R,
  dir: &'a Path,
  options: &'a ResolveOptions,
}

impl<'a, R: Repository + ?Sized> Resolver<'a, R> {
  pub fn new(repo: &'a R, dir: &'a Path, options: &'a ResolveOptions) -> Self {
    Self { repo, dir, options }
  }

  /// Manifest of the commit `sha`.
  pub fn by_sha(&self, sha: &str) -> Result<Manifest, ResolveError> {
    if let Some(empty) = self.empty_manifest()? {
      return Ok(empty);
    }

    let commit = self.commit_by_sha(sha)?;
    self.build(&commit)
  }

  /// Manifest of the tip of `branch`.
  pub fn by_branch(&self, branch: &str) -> Result<Manifest, ResolveError> {
    if let Some(empty) = self.empty_manifest()? {
      return Ok(empty);
    }

    let commit = self.branch_commit(branch)?;
    self.build(&commit)
  }

  /// Applications of `src` changed since it diverged from `dst`.
  pub fn by_pr(&self, src: &str, dst: &str) -> Result<Manifest, ResolveError> {
    if let Some(empty) = self.empty_manifest()? {
      return Ok(empty);
    }

    let head = self.branch_commit(src)?;
    let base = self.branch_commit(dst)?;
    self.changed_since_merge_base(&head, &base)
  }

  /// Applications of `to` changed since it diverged from `from`.
  pub fn by_diff(&self, from: &str, to: &str) -> Result<Manifest, ResolveError> {
    if let Some(empty) = self.empty_manifest()? {
      return Ok(empty);
    }

    let base = self.commit_by_sha(from)?;
    let head = self.commit_by_sha(to)?;
    self.changed_since_merge_base(&head, &base)
  }

  fn empty_manifest(&self) -> Result<Option<Manifest>, ResolveError> {
    let empty = self.repo.is_empty().map_err(|source| self.access_error(source))?;
    if empty {
      debug!(dir = %self.dir.display(), "repository has no commits");
      return Ok(Some(Manifest::empty(self.dir)));
    }
    Ok(None)
  }

  fn changed_since_merge_base(&self, head: &CommitRef, base: &CommitRef) -> Result<Manifest, ResolveError> {
    let changed = self
      .repo
      .merge_base_diff(head, base)
      .map_err(|source| ResolveError::DiffComputation {
        head: head.sha.clone(),
        base: base.sha.clone(),
        source,
      })?;
    debug!(head = %head.sha, base = %base.sha, changed = changed.len(), "computed merge base diff");

    let manifest = self.build(head)?;
    Ok(reduce_to_diff(manifest, &changed))
  }

  fn build(&self, commit: &CommitRef) -> Result<Manifest, ResolveError> {
    build_manifest(self.repo, self.dir, commit, self.options)
  }

  fn commit_by_sha(&self, sha: &str) -> Result<CommitRef, ResolveError> {
    self
      .repo
      .commit_by_sha(sha)
      .map_err(|source| ResolveError::ReferenceResolution {
        reference: sha.to_string(),
        source,
      })
  }

  fn branch_commit(&self, branch: &str) -> Result<CommitRef, ResolveError> {
    self
      .repo
      .branch_commit(branch)
      .map_err(|source| ResolveError::ReferenceResolution {
        reference: branch.to_string(),
        source,
      })
  }

  fn access_error(&self, source: GitError) -> ResolveError {
    ResolveError::RepositoryAccess {
      dir: self.dir.to_path_buf(),
      source,
    }
  }
}

fn open(dir: &Path) -> Result<GixRepository, ResolveError> {
  GixRepository::open(dir).map_err(|source| ResolveError::RepositoryAccess {
    dir: dir.to_path_buf(),
    source,
  })
}

/// Resolve the manifest of the commit `sha` in the repository at `dir`.
///
/// # Errors
///
/// Returns [`ResolveError`] if the repository cannot be read or `sha` is
/// not a full commit id present in it.
pub fn manifest_by_sha(dir: &Path, sha: &str, options: &ResolveOptions) -> Result<Manifest, ResolveError> {
  let repo = open(dir)?;
  Resolver::new(&repo, dir, options).by_sha(sha)
}

/// Resolve the manifest at the tip of local branch `branch`.
///
/// # Errors
///
/// Returns [`ResolveError`] if the repository cannot be read or the branch
/// does not exist.
pub fn manifest_by_branch(dir: &Path, branch: &str, options: &ResolveOptions) -> Result<Manifest, ResolveError> {
  let repo = open(dir)?;
  Resolver::new(&repo, dir, options).by_branch(branch)
}

/// Resolve the applications branch `src` changes relative to branch `dst`.
///
/// The manifest is built on `src` and reduced to the files changed between
/// the merge base of the two branches and `src`.
///
/// # Errors
///
/// Returns [`ResolveError`] if either branch does not resolve or the
/// branches share no history.
pub fn manifest_by_pr(dir: &Path, src: &str, dst: &str, options: &ResolveOptions) -> Result<Manifest, ResolveError> {
  let repo = open(dir)?;
  Resolver::new(&repo, dir, options).by_pr(src, dst)
}

/// Resolve the applications commit `to` changes relative to commit `from`.
///
/// The manifest is built on `to` and reduced to the files changed between
/// the merge base of the two commits and `to`.
///
/// # Errors
///
/// Returns [`ResolveError`] if either commit does not resolve or they share
/// no history.
pub fn manifest_by_diff(dir: &Path, from: &str, to: &str, options: &ResolveOptions) -> Result<Manifest, ResolveError> {
  let repo = open(dir)?;
  Resolver::new(&repo, dir, options).by_diff(from, to)
}
