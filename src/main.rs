// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, parse_indices, render_menu};
use mrfeature::{CliProgress, Engine, ProgressSink, Project, RepositoryClient, ToolConfig};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, warn};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Read selection indices from `--select` or an interactive prompt
fn read_selection(preset: Option<&str>) -> Result<Vec<usize>> {
    let line = match preset {
        Some(line) => line.to_string(),
        None => {
            print!("Enter the numbers of the packages to install, separated by spaces: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read selection")?;
            line
        }
    };

    let parsed = parse_indices(&line);
    for token in &parsed.rejected {
        eprintln!("Warning: ignoring '{}', not a package number", token);
    }
    Ok(parsed.indices)
}

fn run(cli: Cli) -> Result<()> {
    let project = Project::open(&cli.project)?;
    match project.host_version_string() {
        Some(version) => println!("Detected Unity version: {}", version),
        None => println!("Unity version could not be determined"),
    }

    let config = ToolConfig::load(cli.config.as_deref())?;

    let (work_dir, _scratch) = match &cli.work_dir {
        Some(dir) => (dir.clone(), None),
        None => {
            let scratch = tempfile::Builder::new()
                .prefix("mrfeature-")
                .tempdir()
                .context("Failed to create work directory")?;
            (scratch.path().to_path_buf(), Some(scratch))
        }
    };
    debug!("Working in {}", work_dir.display());

    let client = RepositoryClient::new(&config)?;
    let progress = Arc::new(CliProgress::new());
    let mut engine = Engine::new(config, Box::new(client), work_dir).with_progress(progress.clone());

    let catalog = engine.fetch_catalog().context("Failed to fetch package catalog")?;
    progress.finish();
    print!("{}", render_menu(catalog));

    let selected = read_selection(cli.select.as_deref())?;
    if selected.is_empty() {
        println!("No packages selected.");
        return Ok(());
    }

    let progress = Arc::new(CliProgress::new());
    engine.set_progress(progress.clone());

    let resolution = engine.resolve(&selected)?;
    if resolution.is_empty() {
        progress.finish();
        println!("No valid packages selected.");
        return Ok(());
    }

    progress.message("Selected packages:");
    for (identifier, version) in &resolution.user_selection {
        progress.message(&format!("  {} {}", identifier, version));
    }
    for identifier in &resolution.runtime {
        progress.message(&format!("  {}", identifier));
    }
    let dependencies = resolution.dependencies_only();
    if !dependencies.is_empty() {
        progress.message("Dependencies:");
        for (identifier, version) in dependencies {
            progress.message(&format!("  {} {}", identifier, version));
        }
    }
    if !resolution.skipped.is_empty() {
        warn!("{} dependency branches were skipped", resolution.skipped.len());
    }

    engine.fetch_artifacts()?;
    let report = engine.install(&project)?;
    progress.finish();

    println!(
        "Installed {} manifest entries into {}",
        report.entries.len(),
        project.manifest_path().display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
