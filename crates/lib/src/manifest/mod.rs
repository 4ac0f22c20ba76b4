//! Application manifests.
//!
//! A [`Manifest`] is the set of applications present at one commit. It is
//! produced by [`build_manifest`] from a commit's tree and can be narrowed to
//! the applications touched by a change with [`reduce_to_diff`].

mod builder;
mod reduce;
mod types;

pub use builder::build_manifest;
pub use reduce::reduce_to_diff;
pub use types::*;
