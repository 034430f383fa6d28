// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repofinder CLI - find git repositories and remember them

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use repofinder::cache::RepoCache;
use repofinder::scanner;

#[derive(Parser)]
#[command(name = "repofinder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directories to search; defaults to the current directory
    paths: Vec<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Cache file override
    #[arg(long, env = "REPOFINDER_CACHE_FILE")]
    cache_file: Option<std::path::PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "repofinder", &mut std::io::stdout());
        return;
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Logs go to stderr; stdout carries nothing but repository paths.
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut roots = cli.paths;
    if roots.is_empty() {
        let cwd = std::env::current_dir()
            .context("failed to get current working directory")?;
        roots.push(cwd.display().to_string());
    }

    let cache_file = match cli.cache_file {
        Some(path) => path,
        None => RepoCache::default_file()?,
    };

    scanner::search(&roots, &cache_file)
}
