//! sotrace CLI - shared-object dependency graphs from the command line.
//!
//! Traces either a binary on disk or a running process (by pid) and writes
//! the dependency graph as a Graphviz DOT file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use sotrace::{DepGraph, Error};

/// Trace shared-object dependencies of a binary or running process.
#[derive(Parser)]
#[command(name = "sotrace")]
#[command(version, about, long_about = None)]
#[command(after_help = "Render the output with Graphviz, e.g. `dot -Tsvg out.dot > out.svg`.")]
struct Cli {
    /// Path to a binary/shared library, or a numeric process id
    target: String,

    /// Output graph file (.dot)
    out: PathBuf,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let graph = trace_target(&cli.target)?;
    sotrace::dot::write_dot(&cli.out, &graph)?;

    println!(
        "{} {} libraries, {} edges",
        "Traced".green().bold(),
        graph.node_count(),
        graph.edge_count()
    );
    println!("{}: {}", "Wrote".dimmed(), cli.out.display());
    Ok(())
}

/// An all-digit target is a pid, anything else a filesystem path.
fn trace_target(target: &str) -> Result<DepGraph, Error> {
    if is_pid(target) {
        let pid: u32 = target
            .parse()
            .map_err(|_| Error::InvalidTarget(format!("pid out of range: {target}")))?;
        sotrace::trace_process(pid)
    } else {
        Ok(sotrace::trace_binary(Path::new(target)))
    }
}

fn is_pid(target: &str) -> bool {
    !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit())
}
