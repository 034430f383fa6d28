// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persistent record of previously discovered repositories
//!
//! The cache is a JSON file mapping each search root to the repository
//! paths found under it. On disk every entry carries `false`; the `true`
//! state ("already printed this run") only ever exists in memory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Cache file location relative to the user's home directory.
const CACHE_RELATIVE_PATH: &str = ".cache/repofinder/cache.json";

/// Repositories known under one search root, keyed by absolute path.
///
/// The value records whether the path has been reported to the caller
/// during the current run.
pub type RootRepos = BTreeMap<PathBuf, bool>;

/// Previously discovered repositories, partitioned by search root.
///
/// Partitions are keyed by the root path exactly as the caller spelled it;
/// two spellings of the same directory get separate partitions.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoCache {
    roots: BTreeMap<String, RootRepos>,
}

impl RepoCache {
    /// Resolve the per-user cache file location.
    pub fn default_file() -> Result<PathBuf> {
        let dirs =
            directories::BaseDirs::new().context("failed to determine user home dir")?;
        Ok(dirs.home_dir().join(CACHE_RELATIVE_PATH))
    }

    /// Load the cache from `path`.
    ///
    /// A missing file yields an empty cache; a file that exists but cannot
    /// be opened or decoded is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to open cache file {}", path.display()));
            }
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to decode cache {}", path.display()))
    }

    /// Persist the cache to `path`, creating the parent directory if needed.
    ///
    /// Every `reported` flag is cleared first: the file records which
    /// repositories are known, never which ones were already printed.
    pub fn save(mut self, path: &Path) -> Result<()> {
        self.clear_reported();
        let bytes = serde_json::to_vec(&self).context("failed to serialize cache")?;
        if let Some(parent) = path.parent() {
            create_private_dir(parent)
                .with_context(|| format!("failed to create cache dir {}", parent.display()))?;
        }
        write_private(path, &bytes)
            .with_context(|| format!("failed to write cache to {}", path.display()))
    }

    /// Repositories cached under `root`, creating an empty partition if
    /// the root has none yet.
    pub fn partition_mut(&mut self, root: &str) -> &mut RootRepos {
        self.roots.entry(root.to_owned()).or_default()
    }

    /// Repositories cached under `root`, if any.
    #[must_use]
    pub fn partition(&self, root: &str) -> Option<&RootRepos> {
        self.roots.get(root)
    }

    /// Whether `path` is cached under `root` and was already reported.
    #[must_use]
    pub fn already_reported(&self, root: &str, path: &Path) -> bool {
        self.roots
            .get(root)
            .and_then(|repos| repos.get(path))
            .copied()
            .unwrap_or(false)
    }

    /// True when no partition holds any repository.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.values().all(BTreeMap::is_empty)
    }

    fn clear_reported(&mut self) {
        for repos in self.roots.values_mut() {
            for reported in repos.values_mut() {
                *reported = false;
            }
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::write(path, bytes)
}
