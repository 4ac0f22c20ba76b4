//! mbt-lib: Manifest resolution for monorepo builds
//!
//! This crate discovers the applications of a monorepo at a point in git
//! history and works out which of them a change touches:
//! - `descriptor`: parsing of `.mbt.yml` application descriptors
//! - `application`: resolved applications and the registry indexing them
//! - `manifest`: building a manifest from a commit and reducing it to a diff
//! - `resolve`: entry points by commit, branch, pull request and diff
//! - `git`: the read-only repository port and its `gix` implementation

pub mod application;
pub mod consts;
pub mod descriptor;
pub mod git;
pub mod manifest;
pub mod resolve;
pub mod util;

pub use application::{Application, Applications};
pub use manifest::{Manifest, SkippedDescriptor};
pub use resolve::{
  ResolveError, ResolveOptions, Resolver, manifest_by_branch, manifest_by_diff, manifest_by_pr, manifest_by_sha,
};
