// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repofinder library - find git repositories and remember them
//!
//! This crate provides the core functionality for discovering git
//! repositories under a set of root directories, with a per-user cache
//! that makes repeated searches incremental and self-healing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod scanner;
