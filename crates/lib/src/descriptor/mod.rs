//! Application descriptor parsing.
//!
//! Every application directory carries a `.mbt.yml` descriptor:
//!
//! ```yaml
//! version: "1.0"
//! name: api
//! build:
//!   default:
//!     cmd: make
//!     args: [build]
//! properties:
//!   owner: platform-team
//! ```
//!
//! Parsing is lenient about structure (unknown keys are ignored, missing
//! sections default to empty) and strict about types.

mod types;

use thiserror::Error;

pub use types::{BuildCommand, DescriptorSpec};

/// Errors produced while parsing a descriptor document.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("descriptor is not valid UTF-8: {0}")]
  InvalidUtf8(#[source] std::str::Utf8Error),

  #[error("malformed descriptor: {0}")]
  Malformed(#[source] serde_yaml::Error),
}

/// Parse raw descriptor bytes into a [`DescriptorSpec`].
///
/// A document holding nothing but blank lines, comments, bare `---`/`...`
/// markers or an explicit null (`~`, `null`) parses to the default spec.
///
/// # Errors
///
/// Returns [`DescriptorError`] on invalid UTF-8, invalid YAML syntax, or a
/// field of the wrong type.
pub fn parse(bytes: &[u8]) -> Result<DescriptorSpec, DescriptorError> {
  let text = std::str::from_utf8(bytes).map_err(DescriptorError::InvalidUtf8)?;

  if is_blank_document(text) {
    return Ok(DescriptorSpec::default());
  }

  let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(DescriptorError::Malformed)?;
  if value.is_null() {
    return Ok(DescriptorSpec::default());
  }

  serde_yaml::from_value(value).map_err(DescriptorError::Malformed)
}

fn is_blank_document(text: &str) -> bool {
  text
    .lines()
    .map(str::trim)
    .all(|line| line.is_empty() || line.starts_with('#') || line == "---" || line == "...")
}
