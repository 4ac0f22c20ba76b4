//! Well-known names shared across the crate.

/// File name of the descriptor marking an application directory.
pub const DESCRIPTOR_FILE: &str = ".mbt.yml";

/// Path separator used in git tree paths, independent of the host platform.
pub const TREE_PATH_SEPARATOR: char = '/';

/// Git file modes as stored in tree objects.
pub mod mode {
  pub const TREE: u32 = 0o040000;
  pub const FILE: u32 = 0o100644;
  pub const EXECUTABLE: u32 = 0o100755;
  pub const SYMLINK: u32 = 0o120000;
}
