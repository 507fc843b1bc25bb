//! Tracing subscriber setup for the command-line tools
//!
//! Logs always go to stderr so that catalog output on stdout stays valid JSON.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "goreleases=info";

/// Filter used with `--verbose` when `RUST_LOG` is not set
pub const VERBOSE_LOG_FILTER: &str = "goreleases=debug";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// `RUST_LOG` if set, otherwise the default for the verbosity.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(verbose: bool, format: LogFormat) -> Result<(), TryInitError> {
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| {
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
        }))
        .try_init()
}
