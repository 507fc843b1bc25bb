use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use goreleases::config::FetchConfig;
use goreleases::logging::{self, LogFormat};
use goreleases::releases::{check_conflict_files, fetch_releases, write_catalog};
use goreleases::select::{read_candidates, select};
use goreleases::version::Constraints;

#[derive(Parser)]
#[command(name = "goreleases")]
#[command(version, about = "Build and inspect the catalog of Go releases")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch releases from the internet and print them as JSON
    Fetch(FetchArgs),
    /// Check that head has no conflicts with base that would prevent automatic merging
    CheckConflicts(CheckConflictsArgs),
    /// Select matching Go versions from a list
    Select(SelectArgs),
}

#[derive(Args, Default)]
struct FetchArgs {
    /// Go versions to exclude. go1.7.2 is excluded by default because it was retracted
    #[arg(long, value_name = "VERSION")]
    exclude: Vec<String>,

    /// Path to a JSON config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of concurrent checksum requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Args)]
struct CheckConflictsArgs {
    /// Path to the base file
    base: PathBuf,
    /// Path to the head file
    head: PathBuf,
}

#[derive(Args)]
struct SelectArgs {
    /// Constraint to match
    #[arg(short, long)]
    constraint: String,

    /// Maximum number of results to output
    #[arg(short = 'n', long, default_value_t = 0)]
    max_results: usize,

    /// Ignore invalid candidates instead of erroring
    #[arg(short, long)]
    ignore_invalid: bool,

    /// Just validate the constraint. Exits non-zero if invalid
    #[arg(long)]
    validate_constraint: bool,

    /// Candidate versions to consider. A value of "-" reads stdin
    candidates: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.log_format).context("failed to initialize logging")?;

    match cli.command.unwrap_or_else(|| Command::Fetch(FetchArgs::default())) {
        Command::Fetch(args) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_fetch(args)),
        Command::CheckConflicts(args) => run_check_conflicts(args),
        Command::Select(args) => run_select(args),
    }
}

async fn run_fetch(args: FetchArgs) -> anyhow::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => FetchConfig::load(path)?,
        None => FetchConfig::load_default()?,
    };
    if !args.exclude.is_empty() {
        config.skip_versions = args.exclude;
    }
    if let Some(concurrency) = args.concurrency {
        config.checksum_concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    debug!("Fetch config: {:?}", config);

    let options = config.fetch_options();
    let fetch = fetch_releases(&options);
    let result = if config.timeout_secs > 0 {
        tokio::time::timeout(Duration::from_secs(config.timeout_secs), fetch)
            .await
            .with_context(|| format!("fetch timed out after {}s", config.timeout_secs))?
    } else {
        fetch.await
    };
    let releases = result.context("couldn't build releases")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_catalog(&mut out, &releases).context("couldn't encode releases")?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn run_check_conflicts(args: CheckConflictsArgs) -> anyhow::Result<ExitCode> {
    let report = check_conflict_files(&args.base, &args.head)?;
    if report.ok {
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "found a conflict that prevents automatic merging:\n{}",
        report.message
    );
    Ok(ExitCode::FAILURE)
}

fn run_select(args: SelectArgs) -> anyhow::Result<ExitCode> {
    let constraints = Constraints::parse(&args.constraint);

    if args.validate_constraint {
        return Ok(match constraints {
            Ok(constraints) => {
                println!("{}", constraints);
                ExitCode::SUCCESS
            }
            Err(_) => {
                eprintln!("invalid constraint: {:?}", args.constraint);
                ExitCode::FAILURE
            }
        });
    }
    let constraints = constraints?;

    let stdin = io::stdin();
    let versions = read_candidates(&args.candidates, stdin.lock(), args.ignore_invalid)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for version in select(&constraints, args.max_results, &versions) {
        writeln!(out, "{}", version)?;
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
