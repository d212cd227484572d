//! Parsing of textual simulator traces.
//!
//! The simulator emits one record per line. Records of interest carry a
//! program counter and an instruction encoding as `pc = <hex>` and
//! `machcode = <token>` fields, and control transfers are flagged with a bare
//! keyword token (`CALL`, `RETURN`, `SYSCALL` or `SYSRETURN`). Everything
//! before the `**** REAL SIMULATION ****` banner is loader chatter and only
//! participates in static counting.

mod kind;
mod line;

pub use kind::InstructionKind;
pub use line::Line;

/// Banner line separating simulator setup from the simulated execution.
pub const SIMULATION_MARKER: &str = "**** REAL SIMULATION ****";

/// Find the index of the first line after the simulation banner.
///
/// Only the first banner counts. The line must match exactly; surrounding
/// whitespace is not trimmed.
pub fn find_simulation_start<S>(lines: &[S]) -> Option<usize>
where
    S: AsRef<str>,
{
    lines
        .iter()
        .position(|line| line.as_ref() == SIMULATION_MARKER)
        .map(|at| at + 1)
}
