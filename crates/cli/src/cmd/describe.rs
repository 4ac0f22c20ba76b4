//! Describe command implementation.
//!
//! Resolves the applications of a repository for a branch, commit, pull
//! request or commit range and prints them.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use mbt_lib::{Application, Manifest, ResolveOptions, manifest_by_branch, manifest_by_diff, manifest_by_pr, manifest_by_sha};

use crate::output::{display_path, print_info, print_json, print_stat, print_warning, symbols, truncate_hash};

#[derive(Subcommand, Debug)]
pub enum DescribeCommand {
  /// Describe every application at the tip of a branch
  Branch {
    /// Branch name
    #[arg(default_value = "master")]
    name: String,
  },

  /// Describe every application at a commit
  Commit {
    /// Full commit SHA
    sha: String,
  },

  /// Describe applications changed by merging one branch into another
  Pr {
    /// Source branch of the pull request
    #[arg(long)]
    src: String,

    /// Destination branch of the pull request
    #[arg(long)]
    dst: String,
  },

  /// Describe applications changed between two commits
  Diff {
    /// Base commit SHA
    #[arg(long)]
    from: String,

    /// Target commit SHA
    #[arg(long)]
    to: String,
  },
}

impl DescribeCommand {
  fn resolve(&self, dir: &Path, options: &ResolveOptions) -> Result<Manifest> {
    let manifest = match self {
      DescribeCommand::Branch { name } => {
        manifest_by_branch(dir, name, options).with_context(|| format!("Failed to describe branch: {}", name))?
      }
      DescribeCommand::Commit { sha } => {
        manifest_by_sha(dir, sha, options).with_context(|| format!("Failed to describe commit: {}", sha))?
      }
      DescribeCommand::Pr { src, dst } => manifest_by_pr(dir, src, dst, options)
        .with_context(|| format!("Failed to describe pull request: {} {} {}", src, symbols::ARROW, dst))?,
      DescribeCommand::Diff { from, to } => manifest_by_diff(dir, from, to, options)
        .with_context(|| format!("Failed to describe diff: {} {} {}", from, symbols::ARROW, to))?,
    };
    Ok(manifest)
  }
}

pub fn cmd_describe(
  command: DescribeCommand,
  dir: &Path,
  names: &[String],
  strict: bool,
  verbose: bool,
  json: bool,
) -> Result<()> {
  let dir = dunce::canonicalize(dir).with_context(|| format!("Failed to access directory: {}", dir.display()))?;
  debug!(dir = %dir.display(), command = ?command, "describing repository");

  let options = ResolveOptions { strict };
  let mut manifest = command.resolve(&dir, &options)?;
  if !names.is_empty() {
    manifest = manifest.filter_by_names(names);
  }

  for skipped in &manifest.skipped {
    print_warning(&format!(
      "Skipped descriptor in {}: {}",
      display_path(&skipped.path),
      skipped.reason
    ));
  }

  if json {
    print_json(&manifest)?;
  } else {
    print_manifest(&manifest, verbose);
  }

  Ok(())
}

fn print_manifest(manifest: &Manifest, verbose: bool) {
  if manifest.sha.is_empty() {
    print_info("Repository has no commits.");
    return;
  }

  println!("Commit {}", manifest.sha);
  println!();

  if manifest.applications.is_empty() {
    print_info("No applications found.");
    return;
  }

  let (name_width, path_width) = column_widths(manifest.applications.as_slice());

  for app in &manifest.applications {
    let name = pad(&app.name, name_width);
    println!(
      "{}  {}  {}",
      name.if_supports_color(Stream::Stdout, |s| s.bold()),
      pad(display_path(&app.path), path_width),
      truncate_hash(&app.version).if_supports_color(Stream::Stdout, |s| s.dimmed()),
    );
    if verbose {
      print_details(app);
    }
  }
}

/// Widths of the name and path columns, in characters.
fn column_widths(apps: &[Application]) -> (usize, usize) {
  apps.iter().fold((0, 0), |(name, path), app| {
    (
      name.max(app.name.chars().count()),
      path.max(display_path(&app.path).chars().count()),
    )
  })
}

fn pad(text: &str, width: usize) -> String {
  format!("{:width$}", text)
}

fn print_details(app: &Application) {
  for (step, command) in &app.build {
    let mut line = command.cmd.clone();
    for arg in &command.args {
      line.push(' ');
      line.push_str(arg);
    }
    print_stat(step, &line);
  }
  for (key, value) in &app.properties {
    print_stat(key, &format_value(value));
  }
}

fn format_value<T: serde::Serialize>(value: &T) -> String {
  match serde_json::to_value(value) {
    Ok(serde_json::Value::String(s)) => s,
    Ok(other) => other.to_string(),
    Err(_) => String::from("<unprintable>"),
  }
}
