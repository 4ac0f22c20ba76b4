//! Resolved applications and the registry indexing them.
//!
//! An [`Application`] is one independently buildable module of the
//! monorepo, identified by the repository-relative directory holding its
//! descriptor. [`Applications`] keeps them ordered by path and derives the
//! by-name and by-path indexes on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::{BuildCommand, DescriptorSpec};

/// A resolved, addressable unit of build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
  /// Repository-relative directory; empty for the repository root.
  pub path: String,
  /// Content address of the smallest tree containing the application.
  pub version: String,
  /// Name declared in the descriptor.
  pub name: String,
  /// Build steps keyed by step name.
  pub build: BTreeMap<String, BuildCommand>,
  /// Free-form descriptor properties.
  pub properties: BTreeMap<String, serde_yaml::Value>,
}

impl Application {
  /// Build an application from a parsed descriptor found at `path`.
  pub fn new(path: impl Into<String>, version: impl Into<String>, spec: DescriptorSpec) -> Self {
    Self {
      path: path.into(),
      version: version.into(),
      name: spec.name,
      build: spec.build,
      properties: spec.properties,
    }
  }

  /// Whether this application lives at the repository root.
  pub fn is_root(&self) -> bool {
    self.path.is_empty()
  }
}

/// Ordered collection of applications, sorted ascending by path.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Application>")]
pub struct Applications(Vec<Application>);

impl Applications {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self(Vec::new())
  }

  /// Index applications by name.
  ///
  /// Names are not guaranteed unique; when two applications share a name the
  /// one later in path order wins.
  pub fn by_name(&self) -> BTreeMap<&str, &Application> {
    self.0.iter().map(|app| (app.name.as_str(), app)).collect()
  }

  /// Index applications by path.
  pub fn by_path(&self) -> BTreeMap<&str, &Application> {
    self.0.iter().map(|app| (app.path.as_str(), app)).collect()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Application> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_slice(&self) -> &[Application] {
    &self.0
  }

  pub fn into_vec(self) -> Vec<Application> {
    self.0
  }
}

impl From<Vec<Application>> for Applications {
  fn from(mut apps: Vec<Application>) -> Self {
    apps.sort_by(|a, b| a.path.cmp(&b.path));
    Self(apps)
  }
}

impl FromIterator<Application> for Applications {
  fn from_iter<I: IntoIterator<Item = Application>>(iter: I) -> Self {
    Self::from(iter.into_iter().collect::<Vec<_>>())
  }
}

impl<'a> IntoIterator for &'a Applications {
  type Item = &'a Application;
  type IntoIter = std::slice::Iter<'a, Application>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

impl IntoIterator for Applications {
  type Item = Application;
  type IntoIter = std::vec::IntoIter<Application>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}
