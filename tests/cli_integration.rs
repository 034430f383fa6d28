// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the repofinder CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build a repofinder command with the cache redirected into `cache_file`.
fn repofinder(cache_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repofinder").expect("binary builds");
    cmd.env("REPOFINDER_CACHE_FILE", cache_file);
    cmd
}

/// Create `rel` under `base` with a `.git` directory inside it.
fn make_repo(base: &Path, rel: &str) -> PathBuf {
    let repo = base.join(rel);
    fs::create_dir_all(repo.join(".git")).unwrap();
    repo
}

#[test]
fn reports_repos_and_skips_vendor_trees() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    let root = dir.path().join("x");
    let a = make_repo(&root, "a");
    make_repo(&root, "b/node_modules");

    repofinder(&cache_file)
        .arg(&root)
        .assert()
        .success()
        .stdout(format!("{}\n", a.display()));
}

#[test]
fn second_run_reports_the_same_repo_from_cache() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    let root = dir.path().join("x");
    let a = make_repo(&root, "a");
    let expected = format!("{}\n", a.display());

    repofinder(&cache_file)
        .arg(&root)
        .assert()
        .success()
        .stdout(expected.clone());

    repofinder(&cache_file)
        .arg(&root)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn deleted_repo_is_warned_about_then_forgotten() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    let root = dir.path().join("x");
    let a = make_repo(&root, "a");

    repofinder(&cache_file).arg(&root).assert().success();

    fs::remove_dir_all(&a).unwrap();

    // The stale entry is dropped with a warning naming the path.
    repofinder(&cache_file)
        .arg(&root)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains(a.display().to_string()));

    // Once healed, the next run has nothing to warn about.
    repofinder(&cache_file)
        .arg(&root)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("removing").not());
}

#[test]
fn defaults_to_the_current_directory() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    let root = dir.path().join("x");
    make_repo(&root, "a");

    // The search root is the process working directory, which the OS may
    // report with symlinks resolved; build the expectation from that form.
    let expected = root.canonicalize().unwrap().join("a");

    repofinder(&cache_file)
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn nonexistent_root_is_a_fatal_error() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");

    repofinder(&cache_file)
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: failed to index"));
}

#[test]
fn corrupt_cache_file_is_a_fatal_error() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    fs::write(&cache_file, "{ not json").unwrap();
    let root = dir.path().join("x");
    make_repo(&root, "a");

    repofinder(&cache_file)
        .arg(&root)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("error: failed to read cache"));
}

#[test]
fn persisted_cache_never_records_reported_state() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    let root = dir.path().join("x");
    make_repo(&root, "a");

    repofinder(&cache_file).arg(&root).assert().success();

    let cache: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cache_file).unwrap()).unwrap();
    let partitions = cache.as_object().unwrap();
    assert!(partitions.contains_key(&root.display().to_string()));
    for repos in partitions.values() {
        for reported in repos.as_object().unwrap().values() {
            assert_eq!(reported, &serde_json::Value::Bool(false));
        }
    }
}

#[test]
fn root_spellings_get_separate_cache_partitions() {
    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("cache.json");
    let root = dir.path().join("x");
    let a = make_repo(&root, "a");

    let plain = root.display().to_string();
    let slashed = format!("{plain}/");

    repofinder(&cache_file).arg(&plain).assert().success();
    repofinder(&cache_file)
        .arg(&slashed)
        .assert()
        .success()
        .stdout(predicate::str::contains(a.display().to_string()));

    let cache: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cache_file).unwrap()).unwrap();
    let partitions = cache.as_object().unwrap();
    assert!(partitions.contains_key(&plain));
    assert!(partitions.contains_key(&slashed));
}
