//! reqlint - linter for pip requirements manifests
//!
//! Exit codes:
//! - 0: no error-level findings
//! - 1: error-level findings (or warnings with `--deny-warnings`)
//! - 2: the run could not complete (unreadable manifest, bad config or flags)

use clap::Parser;
use reqlint::cli::CliArgs;
use reqlint::config::RunConfig;
use reqlint::orchestrator::Orchestrator;
use reqlint::output::{create_formatter, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for runs that could not complete
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins unless `--verbose` is given
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("reqlint=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::resolve(&args)?;
    if args.verbose {
        eprintln!("reqlint v{}", env!("CARGO_PKG_VERSION"));
        if let Some(path) = &config.config_file {
            eprintln!("Config: {}", path.display());
        }
        eprintln!(
            "Environment: python {} on {} ({})",
            config.environment.python_full_version,
            config.environment.sys_platform,
            config.environment.platform_machine
        );
    }

    let show_progress = !args.quiet && !args.json && io::stderr().is_terminal();
    let deny_warnings = config.policy.deny_warnings;
    let orchestrator = Orchestrator::new(config)?.with_progress(show_progress);
    let report = orchestrator.run().await?;

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.no_color);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.summary.is_failure(deny_warnings) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
