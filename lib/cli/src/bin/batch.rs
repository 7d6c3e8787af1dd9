use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use color_eyre::eyre::bail;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;

use sat_relax_core::classify::{Classifier, Mode, Verdict};
use sat_relax_core::options::{Options, DEFAULT_OPTIONS};
use sat_relax_core::search::{SearchOptions, SearchStatus};

// Run this binary:
// cargo run --release -p sat-relax-cli --bin sat-relax-batch -- tests/data --strict

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// Directory with `sat/` and `unsat/` subdirectories of clause files.
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Maximum number of objective evaluations per file (0 for no limit).
    #[arg(long, value_name = "INT", default_value_t = 50_000_000)]
    max_evals: u64,

    /// Time limit per file, in seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Number of worker threads (0 for all cores).
    #[arg(short = 'j', long, value_name = "INT", default_value_t = 0)]
    jobs: usize,

    /// Exit with an error when any file is misclassified.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug)]
enum Outcome {
    Correct,
    Mismatch(Verdict),
    NotConverged(SearchStatus),
    Failed(String),
}

#[derive(Debug)]
struct Report {
    path: PathBuf,
    expected: Verdict,
    outcome: Outcome,
    time: Duration,
}

fn collect_files(root: &Path, expected: Verdict, dir: &str) -> color_eyre::Result<Vec<(PathBuf, Verdict)>> {
    let pattern = format!("{}/{}/**/*.cnf", root.display(), dir);
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        files.push((entry?, expected));
    }
    debug!("Found {} files matching '{}'", files.len(), pattern);
    Ok(files)
}

fn classify_file(classifier: &Classifier, path: PathBuf, expected: Verdict) -> Report {
    let time_start = Instant::now();
    let outcome = match classifier.classify_clause_file(&path, Mode::FindModel) {
        Ok(c) if c.status != SearchStatus::Converged => Outcome::NotConverged(c.status),
        Ok(c) if c.verdict() == expected => Outcome::Correct,
        Ok(c) => Outcome::Mismatch(c.verdict()),
        Err(e) => Outcome::Failed(e.to_string()),
    };
    Report {
        path,
        expected,
        outcome,
        time: time_start.elapsed(),
    }
}

fn options_from_args(args: &Cli) -> color_eyre::Result<Options> {
    let timeout = match args.timeout {
        Some(t) if !t.is_finite() || t <= 0.0 => bail!("--timeout must be a positive number of seconds, got {}", t),
        Some(t) => Some(Duration::from_secs_f64(t)),
        None => None,
    };
    Ok(Options {
        search: SearchOptions {
            max_evaluations: if args.max_evals == 0 { None } else { Some(args.max_evals) },
            timeout,
            ..DEFAULT_OPTIONS.search
        },
        ..DEFAULT_OPTIONS
    })
}

fn _main(args: &Cli) -> color_eyre::Result<bool> {
    let options = options_from_args(args)?;
    let classifier = Classifier::new(options);

    let mut files = collect_files(&args.root, Verdict::Satisfiable, "sat")?;
    files.extend(collect_files(&args.root, Verdict::Unsatisfiable, "unsat")?);
    if files.is_empty() {
        bail!("No clause files under '{}'", args.root.display());
    }
    info!("Classifying {} files...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed}] [{bar:40.cyan/white}] {pos:>6}/{len} (ETA: {eta}) {msg}")?
            .progress_chars("#>-"),
    );
    let reports: Vec<Report> = files
        .into_par_iter()
        .progress_with(pb)
        .map(|(path, expected)| classify_file(&classifier, path, expected))
        .collect();

    let mut correct = 0;
    let mut mismatches = 0;
    let mut not_converged = 0;
    let mut failed = 0;
    for report in reports.iter().sorted_by(|a, b| a.path.cmp(&b.path)) {
        match &report.outcome {
            Outcome::Correct => {
                correct += 1;
                debug!("{}: {} in {:.3} s", report.path.display(), report.expected, report.time.as_secs_f64());
            }
            Outcome::Mismatch(verdict) => {
                mismatches += 1;
                warn!("{}: expected {}, got {}", report.path.display(), report.expected, verdict);
            }
            Outcome::NotConverged(status) => {
                not_converged += 1;
                warn!("{}: {}", report.path.display(), status);
            }
            Outcome::Failed(message) => {
                failed += 1;
                warn!("{}: {}", report.path.display(), message);
            }
        }
    }

    let total_time: Duration = reports.iter().map(|r| r.time).sum();
    println!(
        "{} files: {} correct, {} mismatched, {} not converged, {} failed ({:.3} s of search)",
        reports.len(),
        correct,
        mismatches,
        not_converged,
        failed,
        total_time.as_secs_f64()
    );
    Ok(mismatches + not_converged + failed == 0)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_time = Instant::now();
    let args = Cli::parse();
    info!("args = {:?}", args);

    if args.jobs > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(args.jobs).build_global()?;
    }

    let all_correct = _main(&args)?;

    info!("All done in {:.3} s", start_time.elapsed().as_secs_f64());
    if args.strict && !all_correct {
        bail!("Some files were not classified as expected");
    }
    Ok(())
}
