//! Command-line front end: one summary line per directory
//!
//! Run with: rsdstats DIR [DIR ...]

use anyhow::{Context, Result};
use clap::Parser;
use rsdstats::corpus::DEFAULT_EXTENSION;
use rsdstats::{Corpus, ErrorPolicy, Options};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Count partially-independent and fully-embedded structures in
/// directories of RST dependency files.
///
/// Prints `DIR,PARTIALLY_INDEPENDENT,FULLY_EMBEDDED` for each directory.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directories of annotated documents
    #[arg(value_name = "DIRS", required = true)]
    dirs: Vec<PathBuf>,

    /// Extension of the document files
    #[arg(long = "ext", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Stop at the first document that can't be read or linked
    #[arg(long)]
    strict: bool,

    /// Worker threads; 1 processes documents sequentially
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log every match with its participants
    #[arg(long)]
    show_matches: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(args: &Args) {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if args.show_matches {
        if let Ok(directive) = "rsdstats::matches=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    if let Some(jobs) = args.jobs.filter(|&n| n > 1) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to start worker threads")?;
    }

    let options = Options {
        policy: if args.strict {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Skip
        },
        parallel: args.jobs != Some(1),
    };

    for dir in &args.dirs {
        if !dir.is_dir() {
            warn!("{} is not a directory", dir.display());
        }

        let corpus = Corpus::from_dir(dir, &args.extension)?;
        let summary = corpus
            .analyze(options)
            .with_context(|| format!("failed to analyze {}", dir.display()))?;

        if summary.skipped > 0 {
            warn!(
                "{}: skipped {} of {} documents",
                dir.display(),
                summary.skipped,
                summary.files + summary.skipped
            );
        }
        println!("{}", summary);
    }

    Ok(())
}
