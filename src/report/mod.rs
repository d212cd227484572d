//! End-to-end analysis of a trace and rendering of its results

use crate::analysis::{
    analyzed_sequence, dynamic_counts, replay, static_counts, Counters, Error, Instruction,
    Trace, TraceEvent,
};
use crate::trace::find_simulation_start;
use log::{error, info};

/// Controls how an `Analysis` is rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Leave instructions which are not control transfers out of the
    /// annotated trace.
    pub control_only: bool,
}

/// The results of replaying the simulated portion of a trace.
#[derive(Debug)]
pub struct Simulation {
    dynamic_counts: Counters,
    log: Trace,

    /// The error that halted the replay, if any.
    failure: Option<Error>,
}

/// Everything learned about a single trace.
#[derive(Debug)]
pub struct Analysis {
    static_counts: Counters,

    /// `None` if the trace has no simulation banner.
    simulation: Option<Simulation>,
}

impl Analysis {
    /// Consume the analysis, yielding the error which made it fail.
    pub fn into_failure(self) -> Option<Error> {
        self.simulation.and_then(|s| s.failure)
    }

    /// Render the analysis as lines of text, ready to be printed.
    pub fn render(&self, opts: &Options) -> Vec<String> {
        let mut out = vec![format!("--- Static {} ---", self.static_counts)];

        let sim = match &self.simulation {
            Some(sim) => sim,
            None => {
                out.push(Error::MissingMarker.to_string());
                return out;
            }
        };

        out.push(format!("--- Dynamic {} ---", sim.dynamic_counts));

        for event in sim.log.iter() {
            match event {
                TraceEvent::Execute { instr, depth } => {
                    if let Some(line) = annotate(instr, *depth, opts) {
                        out.push(line);
                    }
                }
                TraceEvent::StackTail(tail) => {
                    let addrs: Vec<_> = tail.iter().map(|a| format!("{:#x}", a)).collect();
                    out.push(format!("[{}]", addrs.join(", ")));
                }
                TraceEvent::Mismatch { next, depth } => {
                    out.push("RAS wrong".to_string());
                    out.push(String::new());

                    if let Some(line) = annotate(next, *depth, opts) {
                        out.push(line);
                    }
                }
                TraceEvent::Underflow => out.push("RAS underflow".to_string()),
            }
        }

        out
    }
}

/// Format one instruction of the annotated trace, indented by call depth.
fn annotate(instr: &Instruction, depth: usize, opts: &Options) -> Option<String> {
    if opts.control_only && !instr.kind().is_control_transfer() {
        return None;
    }

    Some(format!(
        "{}{:#x} - {}",
        "\t".repeat(depth),
        instr.pc(),
        instr.kind()
    ))
}

/// Analyze the full text of a trace, one entry per line.
///
/// This never fails outright. A trace without a simulation banner yields an
/// analysis with static counts only, and a replay which trips over the
/// return-address stack keeps everything it logged up to that point, along
/// with the error.
pub fn analyze<S>(lines: &[S]) -> Analysis
where
    S: AsRef<str>,
{
    let static_counts = static_counts(lines);

    let start = match find_simulation_start(lines) {
        Some(start) => start,
        None => {
            info!("{}", Error::MissingMarker);
            return Analysis {
                static_counts,
                simulation: None,
            };
        }
    };

    info!(
        "Trace has {} lines, simulation starts at line {}",
        lines.len(),
        start
    );

    let instructions = analyzed_sequence(lines, start);
    let summary = dynamic_counts(&instructions);

    info!(
        "Analyzing {} instructions, {} taken control transfers",
        instructions.len(),
        summary.total()
    );

    let mut log = Trace::new();
    let failure = match replay(&instructions, &mut log) {
        Ok(replayed) if replayed == summary => None,
        Ok(replayed) => Some(Error::DynamicCountMismatch { summary, replay: replayed }),
        Err(e) => Some(e),
    };

    if let Some(e) = &failure {
        error!("Replay halted: {}", e);
    }

    Analysis {
        static_counts,
        simulation: Some(Simulation {
            dynamic_counts: summary,
            log,
            failure,
        }),
    }
}
