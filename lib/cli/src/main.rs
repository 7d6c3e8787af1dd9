use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::bail;
use elapsed::measure_time;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use sat_relax_core::classify::{Classifier, Mode};
use sat_relax_core::cnf::Cnf;
use sat_relax_core::encoder::{Encoding, DEFAULT_STEEPNESS};
use sat_relax_core::options::{Options, DEFAULT_OPTIONS};
use sat_relax_core::search::SearchOptions;
use sat_relax_core::trace::{sample_surface, write_surface, write_trace};

// Run this binary:
// cargo run -p sat-relax-cli --bin sat-relax -- --formula "(a|!b)&(!a|b)"
// cargo run -p sat-relax-cli --bin sat-relax -- tests/data/unsat/pigeons-3-2.cnf --trace trace.txt

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    /// Input file with one clause per line (DIMACS-like).
    #[arg(value_name = "INPUT", required_unless_present = "formula", conflicts_with = "formula")]
    input: Option<PathBuf>,

    /// Formula in clause-text form, e.g. "(a|!b)&(!a|b)".
    #[arg(long, value_name = "TEXT")]
    formula: Option<String>,

    /// Search for a counter-model instead of a model.
    #[arg(long)]
    refute: bool,

    /// Relaxation used for the objective.
    #[arg(long, value_enum, default_value_t = EncodingKind::Dnf)]
    encoding: EncodingKind,

    /// Steepness of the sigmoid gates.
    #[arg(long, value_name = "FLOAT")]
    steepness: Option<f64>,

    /// Do not clip points to the unit cube.
    #[arg(long)]
    no_clamp: bool,

    /// Minimal step size before the saddle probe.
    #[arg(long, value_name = "FLOAT", default_value_t = DEFAULT_OPTIONS.search.min_step)]
    min_step: f64,

    /// Maximum number of objective evaluations (0 for no limit).
    #[arg(long, value_name = "INT", default_value_t = 50_000_000)]
    max_evals: u64,

    /// Time limit for the search, in seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Output file with accepted optimizer steps.
    #[arg(long = "trace", value_name = "FILE")]
    path_trace: Option<PathBuf>,

    /// Output file with the objective surface (two-variable formulas only).
    #[arg(long = "surface", value_name = "FILE")]
    path_surface: Option<PathBuf>,

    /// Grid size for the surface samples.
    #[arg(long, value_name = "INT", default_value_t = 40)]
    density: usize,

    /// Log level.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EncodingKind {
    Dnf,
    Sigmoid,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn options_from_args(args: &Cli) -> color_eyre::Result<Options> {
    let encoding = match (args.encoding, args.steepness) {
        (EncodingKind::Dnf, None) => Encoding::Dnf,
        (EncodingKind::Dnf, Some(_)) => bail!("--steepness requires --encoding sigmoid"),
        (EncodingKind::Sigmoid, steepness) => Encoding::Sigmoid {
            steepness: steepness.unwrap_or(DEFAULT_STEEPNESS),
        },
    };
    if !args.min_step.is_finite() || args.min_step <= 0.0 {
        bail!("--min-step must be positive, got {}", args.min_step);
    }
    let timeout = match args.timeout {
        Some(t) if !t.is_finite() || t <= 0.0 => bail!("--timeout must be a positive number of seconds, got {}", t),
        Some(t) => Some(Duration::from_secs_f64(t)),
        None => None,
    };
    Ok(Options {
        encoding,
        clamp_inputs: !args.no_clamp,
        trace_steps: args.path_trace.is_some(),
        search: SearchOptions {
            min_step: args.min_step,
            max_evaluations: if args.max_evals == 0 { None } else { Some(args.max_evals) },
            timeout,
            ..DEFAULT_OPTIONS.search
        },
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    TermLogger::init(args.log_level.into(), Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;
    info!("args = {:?}", args);

    let options = options_from_args(&args)?;
    info!("options = {:?}", options);

    let cnf = match (&args.input, &args.formula) {
        (Some(path), None) => {
            info!("Reading clauses from '{}'...", path.display());
            Cnf::from_clause_file(path)?
        }
        (None, Some(text)) => Cnf::parse(text)?,
        _ => bail!("exactly one of INPUT and --formula is required"),
    };
    info!("cnf = {}", cnf);

    let classifier = Classifier::new(options);
    let mode = if args.refute { Mode::FindCounterModel } else { Mode::FindModel };

    if let Some(path) = &args.path_surface {
        let (objective, index) = classifier.relaxation(&cnf);
        if index.len() != 2 {
            bail!("--surface requires a formula over exactly 2 variables, got {}", index.len());
        }
        info!("Writing {}x{} surface samples to '{}'...", args.density, args.density, path.display());
        let samples = sample_surface(&objective, args.density);
        let mut f = BufWriter::new(File::create(path)?);
        write_surface(&mut f, &samples)?;
        f.flush()?;
    }

    let (elapsed, classification) = measure_time(|| classifier.classify_cnf(&cnf, mode));
    println!("{}", classification);
    info!("{} in {}", classification.verdict(), elapsed);

    if let (Some(path), Some(steps)) = (&args.path_trace, &classification.trace) {
        info!("Writing {} steps to '{}'...", steps.len(), path.display());
        let mut f = BufWriter::new(File::create(path)?);
        write_trace(&mut f, steps)?;
        f.flush()?;
    }

    Ok(())
}
