//! Narrowing a manifest to the applications a change touches.

use tracing::debug;

use super::Manifest;

/// Keep the applications whose path is a prefix of at least one changed path.
///
/// Matching is a plain string prefix test, so the root application (empty
/// path) is selected by any change at all. The result keeps the input's
/// `dir`, `sha` and `skipped`, and its applications stay sorted by path.
pub fn reduce_to_diff<S: AsRef<str>>(manifest: Manifest, changed: &[S]) -> Manifest {
  let Manifest {
    dir,
    sha,
    applications,
    skipped,
  } = manifest;

  let mut selected = vec![false; applications.len()];
  for path in changed {
    let path = path.as_ref();
    for (app, hit) in applications.iter().zip(selected.iter_mut()) {
      if !*hit && path.starts_with(app.path.as_str()) {
        *hit = true;
      }
    }
  }

  let total = applications.len();
  let applications = applications
    .into_iter()
    .zip(selected)
    .filter_map(|(app, hit)| hit.then_some(app))
    .collect();

  let reduced = Manifest {
    dir,
    sha,
    applications,
    skipped,
  };

  debug!(
    changed = changed.len(),
    total,
    selected = reduced.applications.len(),
    "reduced manifest to diff"
  );

  reduced
}
