//! Descriptor document types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A named shell invocation: a program and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCommand {
  /// Program to run.
  pub cmd: String,
  /// Arguments passed to the program, in order.
  #[serde(default, deserialize_with = "null_as_default")]
  pub args: Vec<String>,
}

/// The parsed form of one `.mbt.yml` document.
///
/// Exists only between parsing and the construction of an
/// [`Application`](crate::application::Application).
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct DescriptorSpec {
  /// Descriptor format version.
  #[serde(default, deserialize_with = "null_as_default")]
  pub version: String,
  /// Application name.
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  /// Build steps keyed by step name.
  #[serde(default, deserialize_with = "null_as_default")]
  pub build: BTreeMap<String, BuildCommand>,
  /// Free-form properties, passed through untouched.
  #[serde(default, deserialize_with = "null_as_default")]
  pub properties: BTreeMap<String, serde_yaml::Value>,
}

/// Treat an explicit YAML null (`key:` or `key: ~`) the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
