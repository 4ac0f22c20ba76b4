//! Manifest types for mbt.
//!
//! The manifest is the resolved set of applications at one point in history.
//! It records where it was resolved from (`dir`), the commit it describes
//! (`sha`) and the applications found there, sorted by path.
//!
//! # Serialization
//!
//! Manifests serialize to JSON for `mbt describe --json`:
//!
//! ```json
//! {
//!   "dir": "/work/monorepo",
//!   "sha": "3f2a9c...",
//!   "applications": [
//!     { "path": "services/api", "version": "91be04...", "name": "api", "build": {}, "properties": {} }
//!   ]
//! }
//! ```
//!
//! Indexes by name and by path are derived on demand and never stored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::application::{Application, Applications};

/// A descriptor that could not be turned into an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDescriptor {
  /// Directory holding the descriptor.
  pub path: String,
  /// Why it was skipped.
  pub reason: String,
}

/// The applications present at one commit.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  /// Working directory the manifest was resolved from.
  pub dir: PathBuf,
  /// Resolved commit id; empty for a repository without commits.
  pub sha: String,
  /// Applications sorted ascending by path.
  pub applications: Applications,
  /// Descriptors skipped while building, in path order.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skipped: Vec<SkippedDescriptor>,
}

impl Manifest {
  /// The manifest of a repository without commits.
  pub fn empty(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: dir.into(),
      ..Default::default()
    }
  }

  pub fn by_name(&self) -> BTreeMap<&str, &Application> {
    self.applications.by_name()
  }

  pub fn by_path(&self) -> BTreeMap<&str, &Application> {
    self.applications.by_path()
  }

  /// Keep only the applications whose name is listed.
  ///
  /// Lookup goes through [`Applications::by_name`], so among applications
  /// sharing a name only the last in path order can be selected. Unknown
  /// names are ignored.
  pub fn filter_by_names<S: AsRef<str>>(&self, names: &[S]) -> Manifest {
    let index = self.by_name();
    let wanted: BTreeSet<&str> = names.iter().map(|n| n.as_ref()).collect();

    let applications = wanted
      .into_iter()
      .filter_map(|name| index.get(name).map(|app| (*app).clone()))
      .collect();

    Manifest {
      dir: self.dir.clone(),
      sha: self.sha.clone(),
      applications,
      skipped: self.skipped.clone(),
    }
  }
}
