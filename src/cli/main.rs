//! CLI entry point

use crate::analysis::Result;
use crate::report::{self, Options};
use clap::{Arg, ArgMatches};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::fs;
use std::io::{self, Write};

pub fn main() -> io::Result<()> {
    let mut app = app_from_crate!();
    app = app.arg(
        Arg::with_name("trace")
            .value_name("trace.log")
            .index(1)
            .required(true)
            .help("The simulator trace to analyze"),
    );
    app = app.arg(
        Arg::with_name("control_only")
            .short("c")
            .long("control-only")
            .help("Only list control-transfer instructions in the annotated trace"),
    );
    app = app.arg(
        Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .multiple(true)
            .help("Log more about the analysis to stderr; repeat for more detail"),
    );

    let matches = app.get_matches();

    init_logging(matches.occurrences_of("verbose"))?;

    let trace_path = matches
        .value_of("trace")
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Did not provide a trace"))?;

    let stdout = io::stdout();
    run(trace_path, &options_from_matches(&matches), &mut stdout.lock()).map_err(Into::into)
}

/// Analyze the trace at `trace_path` and write the report to `out`.
///
/// The report is written in full even when the replay fails; the failure is
/// yielded afterwards. Nothing but the report goes to `out`, log records go
/// to stderr.
pub fn run<W: Write>(trace_path: &str, opts: &Options, out: &mut W) -> Result<()> {
    let text = fs::read_to_string(trace_path)?;
    let lines: Vec<&str> = text.lines().collect();

    info!("Read {} lines from {}", lines.len(), trace_path);

    let analysis = report::analyze(&lines);

    for line in analysis.render(opts) {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    match analysis.into_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn options_from_matches(matches: &ArgMatches<'_>) -> Options {
    Options {
        control_only: matches.is_present("control_only"),
    }
}

pub(super) fn log_level(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbosity: u64) -> io::Result<()> {
    SimpleLogger::new()
        .with_level(log_level(verbosity))
        .init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}
