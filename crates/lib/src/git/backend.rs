//! `gix`-backed repository.

use std::path::Path;

use gix::ObjectId;
use gix::object::tree::diff::ChangeDetached;
use tracing::debug;

use super::{CommitRef, EntryKind, GitError, Repository, TreeEntry};

/// A repository opened through `gix`.
///
/// Each resolution opens its own handle; nothing is shared between calls.
pub struct GixRepository {
  repo: gix::Repository,
}

impl GixRepository {
  /// Open the repository whose working tree (or git dir) is `dir`.
  pub fn open(dir: &Path) -> Result<Self, GitError> {
    debug!(path = %dir.display(), "opening repository");
    let repo = gix::open(dir).map_err(|e| GitError::Open {
      path: dir.to_path_buf(),
      source: Box::new(e),
    })?;

    Ok(Self { repo })
  }

  fn load_commit(&self, id: ObjectId, reference: &str) -> Result<CommitRef, GitError> {
    let commit = self.repo.find_commit(id).map_err(|e| GitError::ReferenceNotFound {
      reference: reference.to_string(),
      source: Box::new(e),
    })?;

    let tree = commit.tree_id().map_err(|e| GitError::Decode {
      id: id.to_string(),
      source: Box::new(e),
    })?;

    Ok(CommitRef {
      sha: id.to_string(),
      tree: tree.to_string(),
    })
  }

  fn load_tree(&self, tree: &str) -> Result<gix::Tree<'_>, GitError> {
    let id = parse_id(tree)?;
    self.repo.find_tree(id).map_err(|e| GitError::ObjectNotFound {
      id: id.to_string(),
      source: Box::new(e),
    })
  }
}

/// Changes to tree entries themselves; their files are reported separately.
fn is_tree_change(change: &ChangeDetached) -> bool {
  match change {
    ChangeDetached::Modification {
      previous_entry_mode,
      entry_mode,
      ..
    } => previous_entry_mode.is_tree() && entry_mode.is_tree(),
    other => other.entry_mode().is_tree(),
  }
}

fn parse_id(id: &str) -> Result<ObjectId, GitError> {
  ObjectId::from_hex(id.as_bytes()).map_err(|e| GitError::InvalidObjectId {
    id: id.to_string(),
    source: Box::new(e),
  })
}

impl Repository for GixRepository {
  fn is_empty(&self) -> Result<bool, GitError> {
    let head = self.repo.head().map_err(|e| GitError::Head { source: Box::new(e) })?;
    if !head.is_unborn() {
      return Ok(false);
    }

    // An unborn HEAD alone is not enough: HEAD may name a missing branch
    // while other branches hold commits.
    let references = self
      .repo
      .references()
      .map_err(|e| GitError::References { source: Box::new(e) })?;
    let mut all = references
      .all()
      .map_err(|e| GitError::References { source: Box::new(e) })?;
    Ok(all.next().is_none())
  }

  fn branch_commit(&self, branch: &str) -> Result<CommitRef, GitError> {
    let spec = format!("refs/heads/{}", branch);
    let id = self
      .repo
      .rev_parse_single(spec.as_str())
      .map_err(|e| GitError::ReferenceNotFound {
        reference: branch.to_string(),
        source: Box::new(e),
      })?
      .detach();

    debug!(branch, commit = %id, "resolved branch");
    self.load_commit(id, branch)
  }

  fn commit_by_sha(&self, sha: &str) -> Result<CommitRef, GitError> {
    let id = parse_id(sha)?;
    self.load_commit(id, sha)
  }

  fn merge_base(&self, one: &CommitRef, two: &CommitRef) -> Result<CommitRef, GitError> {
    let base = self
      .repo
      .merge_base(parse_id(&one.sha)?, parse_id(&two.sha)?)
      .map_err(|e| GitError::MergeBase {
        one: one.sha.clone(),
        two: two.sha.clone(),
        source: Box::new(e),
      })?
      .detach();

    debug!(one = %one.sha, two = %two.sha, base = %base, "resolved merge base");
    self.load_commit(base, &base.to_string())
  }

  fn merge_base_diff(&self, head: &CommitRef, base: &CommitRef) -> Result<Vec<String>, GitError> {
    let ancestor = self.merge_base(head, base)?;
    let old_tree = self.load_tree(&ancestor.tree)?;
    let new_tree = self.load_tree(&head.tree)?;

    let changes = self
      .repo
      .diff_tree_to_tree(&old_tree, &new_tree, gix::diff::Options::default())
      .map_err(|e| GitError::TreeDiff {
        old: ancestor.tree.clone(),
        new: head.tree.clone(),
        source: Box::new(e),
      })?;

    let mut changed: Vec<String> = changes
      .iter()
      .filter(|change| !is_tree_change(change))
      .map(|change| change.location().to_string())
      .collect();
    changed.sort();
    changed.dedup();

    debug!(base = %ancestor.sha, head = %head.sha, changed = changed.len(), "diffed against merge base");
    Ok(changed)
  }

  fn tree_entries(&self, tree: &str) -> Result<Vec<TreeEntry>, GitError> {
    let id = parse_id(tree)?;
    let tree = self.load_tree(tree)?;

    let decoded = tree.decode().map_err(|e| GitError::Decode {
      id: id.to_string(),
      source: Box::new(e),
    })?;

    let entries = decoded
      .entries
      .iter()
      .map(|entry| {
        let kind = if entry.mode.is_tree() {
          EntryKind::Tree
        } else if entry.mode.is_commit() {
          EntryKind::Other
        } else {
          EntryKind::Blob
        };
        TreeEntry {
          name: entry.filename.to_string(),
          kind,
          mode: entry.mode.kind() as u32,
          id: entry.oid.to_string(),
        }
      })
      .collect();

    Ok(entries)
  }

  fn read_blob(&self, id: &str) -> Result<Vec<u8>, GitError> {
    let id = parse_id(id)?;
    let mut blob = self.repo.find_blob(id).map_err(|e| GitError::ObjectNotFound {
      id: id.to_string(),
      source: Box::new(e),
    })?;

    Ok(std::mem::take(&mut blob.data))
  }
}
