/*!
 * Command-line interface for dirsnap
 */

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dirsnap::config::{Args, Config};
use dirsnap::report::{print_report, ScanReport};
use dirsnap::scanner::Scanner;
use dirsnap::writer::{render, write_output};
use dirsnap::Result;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "dirsnap", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    // Create configuration
    let config = Config::from_args(args);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(config: &Config) -> Result<()> {
    // Validate configuration before touching the tree
    config.validate()?;

    let progress = if config.quiet {
        ProgressBar::hidden()
    } else {
        spinner()
    };
    progress.set_message(format!("Scanning directory: {}", config.root.display()));

    let scanner = Scanner::new(config.clone(), Arc::new(progress.clone()))?;
    let start_time = Instant::now();

    let scanned = scanner.scan();
    progress.finish_and_clear();
    let tree = scanned?;

    let bytes = render(&tree, config.format)?;
    write_output(&bytes, config.output.as_deref())?;

    let destination = config
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(format = %config.format, output = %destination, bytes = bytes.len(), "snapshot written");

    if !config.quiet {
        print_report(&ScanReport::from_tree(&tree, destination, start_time.elapsed()));
    }

    Ok(())
}

/// Spinner on stderr, ticking once per file
fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} {pos} files {wide_msg:.dim.white}")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Initialize tracing subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
