//! Hamlet: test-dialect transpiler CLI

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use hamlet::config::load_config;
use hamlet::reporter::{render_json, ConsoleReporter, FileReport};
use hamlet::{transform, Direction, TransformOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Hamlet: bidirectional transpiler between unittest and pytest dialects
#[derive(Parser, Debug)]
#[command(name = "hamlet")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Test file or directory to transform
    path: PathBuf,

    /// Transform direction: xunit-to-fixture (unittest-to-pytest) or
    /// fixture-to-xunit (pytest-to-unittest)
    #[arg(long, short)]
    direction: Option<String>,

    /// Rewrite files in place (required for directories)
    #[arg(long, short)]
    write: bool,

    /// Exit 1 if any file would change, without writing
    #[arg(long)]
    check: bool,

    /// Write the transformed source of a single file here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Emit a JSON report on stdout
    #[arg(long, short)]
    json: bool,

    /// Quiet mode (diagnostics and failures only)
    #[arg(long, short)]
    quiet: bool,

    /// Path to config file (default: search .hamletrc.json upward)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of parallel threads for directory runs
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let work_dir = if args.path.is_file() {
        args.path.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        args.path.clone()
    };
    let config = load_config(&work_dir, args.config.as_deref())?;

    let direction = match &args.direction {
        Some(value) => value
            .parse::<Direction>()
            .map_err(|e| anyhow::anyhow!(e))?,
        None => config
            .direction()?
            .context("No direction given: pass --direction or set it in .hamletrc.json")?,
    };
    let options = config.to_options()?;

    let files = collect_test_files(&args.path, &config)?;
    if files.is_empty() {
        anyhow::bail!("No test files found under {}", args.path.display());
    }
    if files.len() > 1 && !(args.write || args.check || args.json) {
        anyhow::bail!("Transforming a directory requires --write, --check, or --json");
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let results: Vec<(PathBuf, String, hamlet::TransformOutcome)> = if files.len() > 1 {
        use rayon::prelude::*;
        files
            .par_iter()
            .map(|path| transform_one(path, direction, &options))
            .collect::<Result<Vec<_>>>()?
    } else {
        files
            .iter()
            .map(|path| transform_one(path, direction, &options))
            .collect::<Result<Vec<_>>>()?
    };

    let reports: Vec<FileReport> = results
        .iter()
        .map(|(path, source, outcome)| FileReport::new(path, source, outcome))
        .collect();

    let console = ConsoleReporter::new(args.quiet);
    for report in &reports {
        console.report(report);
    }

    if args.json {
        println!("{}", render_json(&reports)?);
    }

    let mut any_changed = false;
    for (path, source, outcome) in &results {
        let Some(output) = &outcome.output else {
            continue;
        };
        if output != source {
            any_changed = true;
        }
        if args.check {
            continue;
        }
        if args.write {
            if output != source {
                fs::write(path, output)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        } else if let Some(out_path) = &args.output {
            fs::write(out_path, output)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
        } else if !args.json {
            print!("{}", output);
        }
    }

    if !args.quiet && files.len() > 1 {
        console.summary(&reports);
    }

    let any_failed = reports.iter().any(|r| r.failed);
    if any_failed {
        return Ok(ExitCode::from(1));
    }
    if args.check && any_changed {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn transform_one(
    path: &Path,
    direction: Direction,
    options: &TransformOptions,
) -> Result<(PathBuf, String, hamlet::TransformOutcome)> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test file: {}", path.display()))?;
    let mut options = options.clone();
    options.module_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(String::from);
    let outcome = transform(&source, direction, &options);
    Ok((path.to_path_buf(), source, outcome))
}

fn collect_test_files(path: &Path, config: &hamlet::config::Config) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("Path not found: {}", path.display());
    }
    let patterns = config.test_patterns()?;
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if patterns.iter().any(|p| p.is_match(&name)) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}
