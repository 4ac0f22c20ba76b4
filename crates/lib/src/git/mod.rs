//! Read-only access to git history.
//!
//! The resolution core only needs a narrow slice of git: resolving commits,
//! listing tree entries, reading blobs and finding merge bases. That slice is
//! the [`Repository`] trait; tree walks, path lookups and merge-base diffs are
//! provided on top of it so every backend shares the same traversal rules.
//!
//! [`GixRepository`] is the production backend.

mod backend;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TREE_PATH_SEPARATOR;

pub use backend::GixRepository;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by a repository backend.
#[derive(Debug, Error)]
pub enum GitError {
  /// The repository could not be opened.
  #[error("failed to open repository at '{}': {source}", path.display())]
  Open {
    path: PathBuf,
    #[source]
    source: BoxError,
  },

  /// HEAD could not be read.
  #[error("failed to read HEAD: {source}")]
  Head {
    #[source]
    source: BoxError,
  },

  /// A string is not a valid hex object id.
  #[error("invalid object id '{id}': {source}")]
  InvalidObjectId {
    id: String,
    #[source]
    source: BoxError,
  },

  /// A branch or commit does not resolve.
  #[error("reference '{reference}' not found: {source}")]
  ReferenceNotFound {
    reference: String,
    #[source]
    source: BoxError,
  },

  /// An object is missing or has an unexpected type.
  #[error("object '{id}' not found: {source}")]
  ObjectNotFound {
    id: String,
    #[source]
    source: BoxError,
  },

  /// An object exists but could not be decoded.
  #[error("failed to decode object '{id}': {source}")]
  Decode {
    id: String,
    #[source]
    source: BoxError,
  },

  /// A path does not exist in a tree.
  #[error("path '{path}' not found in tree")]
  PathNotFound { path: String },

  /// References could not be listed.
  #[error("failed to list references: {source}")]
  References {
    #[source]
    source: BoxError,
  },

  /// Two trees could not be compared.
  #[error("failed to diff tree '{old}' against '{new}': {source}")]
  TreeDiff {
    old: String,
    new: String,
    #[source]
    source: BoxError,
  },

  /// No merge base could be computed for two commits.
  #[error("no merge base between '{one}' and '{two}': {source}")]
  MergeBase {
    one: String,
    two: String,
    #[source]
    source: BoxError,
  },
}

/// A resolved commit: its own id and the id of its root tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
  pub sha: String,
  pub tree: String,
}

/// Object type of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
  Blob,
  Tree,
  /// Submodule commits and anything else that is neither a blob nor a tree.
  Other,
}

/// One entry of a tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
  pub name: String,
  pub kind: EntryKind,
  /// Git file mode, e.g. `0o100755` for an executable file.
  pub mode: u32,
  pub id: String,
}

impl TreeEntry {
  pub fn is_tree(&self) -> bool {
    self.kind == EntryKind::Tree
  }

  pub fn is_blob(&self) -> bool {
    self.kind == EntryKind::Blob
  }
}

/// Signal returned by a tree walk visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
  /// Keep walking, descending into the entry if it is a tree.
  Continue,
  /// Do not descend into this entry.
  SkipSubtree,
}

/// Read-only capabilities the resolution core needs from git.
///
/// Object ids are passed around as lowercase hex strings so callers never
/// depend on a particular backend's id types.
pub trait Repository {
  /// Whether the repository has no commits: HEAD is unborn and no
  /// references exist.
  fn is_empty(&self) -> Result<bool, GitError>;

  /// Resolve a local branch name to the commit at its tip.
  fn branch_commit(&self, branch: &str) -> Result<CommitRef, GitError>;

  /// Resolve a full hex commit id.
  fn commit_by_sha(&self, sha: &str) -> Result<CommitRef, GitError>;

  /// Find the best common ancestor of two commits.
  fn merge_base(&self, one: &CommitRef, two: &CommitRef) -> Result<CommitRef, GitError>;

  /// List the direct entries of a tree.
  fn tree_entries(&self, tree: &str) -> Result<Vec<TreeEntry>, GitError>;

  /// Read the raw content of a blob.
  fn read_blob(&self, id: &str) -> Result<Vec<u8>, GitError>;

  /// Walk the commit's tree depth-first, pre-order.
  ///
  /// The visitor receives the entry's parent prefix (`""` at the root,
  /// otherwise the parent path with a trailing `/`, e.g. `services/api/`)
  /// and the entry itself. Every reachable entry is visited exactly once
  /// unless a visitor skips its subtree.
  fn walk_tree(
    &self,
    commit: &CommitRef,
    visitor: &mut dyn FnMut(&str, &TreeEntry) -> WalkAction,
  ) -> Result<(), GitError> {
    walk_subtree(self, &commit.tree, "", visitor)
  }

  /// Look up the entry at a `/`-separated path in the commit's tree.
  fn entry_by_path(&self, commit: &CommitRef, path: &str) -> Result<TreeEntry, GitError> {
    let not_found = || GitError::PathNotFound { path: path.to_string() };

    let mut segments = path.split(TREE_PATH_SEPARATOR).filter(|s| !s.is_empty()).peekable();
    let mut tree = commit.tree.clone();

    while let Some(segment) = segments.next() {
      let entry = self
        .tree_entries(&tree)?
        .into_iter()
        .find(|e| e.name == segment)
        .ok_or_else(not_found)?;

      if segments.peek().is_none() {
        return Ok(entry);
      }
      if !entry.is_tree() {
        return Err(not_found());
      }
      tree = entry.id;
    }

    Err(not_found())
  }

  /// Paths of files changed between the merge base of `head` and `base`
  /// and `head` itself.
  ///
  /// Paths are reported on the new side; deleted files keep their old path.
  /// Mode-only changes and file/symlink switches count as changes. The result
  /// is sorted and free of duplicates.
  fn merge_base_diff(&self, head: &CommitRef, base: &CommitRef) -> Result<Vec<String>, GitError> {
    let ancestor = self.merge_base(head, base)?;

    let mut changed = Vec::new();
    diff_trees(self, Some(&ancestor.tree), Some(&head.tree), "", &mut changed)?;
    changed.sort();
    changed.dedup();
    Ok(changed)
  }
}

fn walk_subtree<R: Repository + ?Sized>(
  repo: &R,
  tree: &str,
  prefix: &str,
  visitor: &mut dyn FnMut(&str, &TreeEntry) -> WalkAction,
) -> Result<(), GitError> {
  for entry in repo.tree_entries(tree)? {
    let action = visitor(prefix, &entry);
    if entry.is_tree() && action == WalkAction::Continue {
      let child_prefix = format!("{}{}{}", prefix, entry.name, TREE_PATH_SEPARATOR);
      walk_subtree(repo, &entry.id, &child_prefix, visitor)?;
    }
  }
  Ok(())
}

/// Collect the file paths that differ between two (optional) trees.
///
/// Subtrees with equal ids are identical by content and are not descended.
fn diff_trees<R: Repository + ?Sized>(
  repo: &R,
  old: Option<&str>,
  new: Option<&str>,
  prefix: &str,
  changed: &mut Vec<String>,
) -> Result<(), GitError> {
  if old == new {
    return Ok(());
  }

  let old_entries = match old {
    Some(tree) => repo.tree_entries(tree)?,
    None => Vec::new(),
  };
  let new_entries = match new {
    Some(tree) => repo.tree_entries(tree)?,
    None => Vec::new(),
  };

  let old_by_name: BTreeMap<&str, &TreeEntry> = old_entries.iter().map(|e| (e.name.as_str(), e)).collect();
  let new_by_name: BTreeMap<&str, &TreeEntry> = new_entries.iter().map(|e| (e.name.as_str(), e)).collect();
  let names: BTreeSet<&str> = old_by_name.keys().chain(new_by_name.keys()).copied().collect();

  for name in names {
    let old_entry = old_by_name.get(name).copied();
    let new_entry = new_by_name.get(name).copied();

    if matches!((old_entry, new_entry), (Some(o), Some(n)) if o.id == n.id && o.mode == n.mode) {
      continue;
    }

    let path = format!("{}{}", prefix, name);

    let old_tree = old_entry.filter(|e| e.is_tree()).map(|e| e.id.as_str());
    let new_tree = new_entry.filter(|e| e.is_tree()).map(|e| e.id.as_str());
    if old_tree.is_some() || new_tree.is_some() {
      let child_prefix = format!("{}{}", path, TREE_PATH_SEPARATOR);
      diff_trees(repo, old_tree, new_tree, &child_prefix, changed)?;
    }

    let old_file = old_entry.is_some_and(|e| !e.is_tree());
    let new_file = new_entry.is_some_and(|e| !e.is_tree());
    if old_file || new_file {
      changed.push(path);
    }
  }

  Ok(())
}
