mod args;
mod config;
mod events;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    process,
};

use anyhow::Context;
use clap::Parser;
use documenter_reporter::DocumenterReporter;
use documenter_reporting::Reporter;
use documenter_utils::{backtrace::PrefixFilter, exit::ExitCode};
use termcolor::StandardStream;
use tracing_subscriber::EnvFilter;

use args::Cli;
use config::{load_documenter_config, Settings};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DOCUMENTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();

    let exit_code = match run(args) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("documenter: {error:#}");
            ExitCode::DOCUMENTER_ERROR
        }
    };

    process::exit(exit_code.get());
}

fn run(args: Cli) -> anyhow::Result<ExitCode> {
    let config = load_documenter_config(args.config.as_deref())?;
    let Settings {
        color,
        options,
        backtrace_exclude,
    } = Settings::new(config, &args);
    tracing::debug!(?color, ?options, ?backtrace_exclude, "resolved settings");

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open events file {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let stdout = StandardStream::stdout(color.color_choice(atty::Stream::Stdout));

    let summary = events::replay(input, move || {
        let reporter = DocumenterReporter::start(
            Box::new(stdout),
            Box::new(PrefixFilter::new(backtrace_exclude)),
            options,
        )?;
        Ok(Box::new(reporter) as Box<dyn Reporter>)
    })?;

    Ok(summary.exit_code())
}
