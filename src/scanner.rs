// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository discovery across directory trees
//!
//! A repository is any directory that directly contains a `.git`
//! directory. Search replays the cache first, then walks each root
//! top-down, pruning hidden and vendor trees and never descending into a
//! repository once found.

use crate::cache::RepoCache;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory names that never hold repositories worth reporting.
const IGNORED_NAMES: &[&str] = &["node_modules", "build"];

/// Trailing components of module-cache trees (e.g. `$GOPATH/pkg/mod`).
const MODULE_CACHE_SUFFIX: &str = "pkg/mod";

/// Search `roots` for repositories, printing one absolute path per line.
///
/// The cache at `cache_file` is replayed first so repositories found by an
/// earlier run are reported without re-walking their subtrees, then each
/// root is traversed for new ones. The updated cache is persisted once,
/// after every root has been processed; a failed traversal leaves the
/// on-disk cache untouched.
pub fn search(roots: &[String], cache_file: &Path) -> Result<()> {
    let mut cache = RepoCache::load(cache_file).context("failed to read cache")?;
    let stdout = io::stdout();
    search_with(roots, &mut cache, &mut stdout.lock())?;
    cache.save(cache_file)
}

/// Search against an explicit cache and output sink.
///
/// Loading and persisting the cache is the caller's business.
pub fn search_with(
    roots: &[String],
    cache: &mut RepoCache,
    out: &mut dyn Write,
) -> Result<()> {
    for root in roots {
        replay_root(root, cache, out)?;
    }
    for root in roots {
        walk_root(root, cache, out).with_context(|| format!("failed to index {root}"))?;
    }
    Ok(())
}

/// Re-report every cached repository under `root` that still exists,
/// dropping the ones that no longer do.
fn replay_root(root: &str, cache: &mut RepoCache, out: &mut dyn Write) -> Result<()> {
    let repos = cache.partition_mut(root);
    repos.retain(|path, _| match fs::symlink_metadata(path) {
        Ok(_) => true,
        Err(err) => {
            warn!("removing {} from cache: {err}", path.display());
            false
        }
    });
    for (path, reported) in repos.iter_mut() {
        writeln!(out, "{}", path.display())?;
        *reported = true;
    }
    Ok(())
}

/// Walk `root` top-down, reporting newly discovered repositories.
fn walk_root(root: &str, cache: &mut RepoCache, out: &mut dyn Write) -> Result<()> {
    debug!("walking {root}");
    let mut walker = WalkDir::new(root).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_permission_denied(&err) => {
                let path = err.path().unwrap_or_else(|| Path::new(root));
                warn!("permission denied on {}: {err}", path.display());
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        if is_hidden(path) || is_ignored(path) {
            walker.skip_current_dir();
            continue;
        }
        let abs = std::path::absolute(path)
            .with_context(|| format!("failed to get absolute dir of {}", path.display()))?;
        if cache.already_reported(root, &abs) {
            walker.skip_current_dir();
            continue;
        }
        if is_repo(path) {
            writeln!(out, "{}", abs.display())?;
            cache.partition_mut(root).insert(abs, true);
            walker.skip_current_dir();
        }
    }
    Ok(())
}

fn is_permission_denied(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::PermissionDenied)
}

/// Hidden means the final path component starts with a dot. A root given
/// as `.` or `..` has no final component and is walked normally.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn is_ignored(path: &Path) -> bool {
    if path.ends_with(MODULE_CACHE_SUFFIX) {
        return true;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| IGNORED_NAMES.contains(&name))
}

/// A directory is a repository root iff it directly contains a `.git`
/// directory. A file or symlink named `.git` does not qualify.
fn is_repo(path: &Path) -> bool {
    fs::symlink_metadata(path.join(".git"))
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
